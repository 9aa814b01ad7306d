//! Storefront scraping: sessions, search resolution, price extraction.

pub mod blocked;
pub mod error;
pub mod extractor;
pub mod lookup;
pub mod models;
pub mod price;
pub mod resolver;
pub mod selectors;
pub mod session;

pub use error::FetchError;
pub use extractor::PriceExtractor;
pub use lookup::{PriceLookup, PriceSource};
pub use models::{Availability, Isbn, IsbnError, PriceCategory, PriceReport, PriceResult};
pub use price::parse_price;
pub use resolver::ProductResolver;
pub use session::{Session, SessionManager, SessionOptions};
