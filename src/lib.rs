//! bookprice - Used-book price lookup by ISBN
//!
//! Scrapes amazon.co.jp search and product pages with TLS fingerprint
//! emulation, and reports at most one price per ISBN.

pub mod commands;
pub mod config;
pub mod format;
pub mod server;
pub mod storefront;

pub use config::Config;
pub use storefront::{Isbn, PriceCategory, PriceLookup, PriceResult, PriceSource};
