//! CLI command implementations.

pub mod lookup;

pub use lookup::{lookup_reports, LookupCommand};
