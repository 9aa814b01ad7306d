//! Data models for ISBN lookups and price results.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Currency reported for every price scraped from the storefront.
pub const CURRENCY: &str = "JPY";

/// Rejected ISBN input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid ISBN format")]
pub struct IsbnError;

/// Normalized ISBN-10 or ISBN-13 used as the lookup key.
///
/// Hyphens and spaces are removed on parse. Check digits are not verified;
/// an ISBN that passes the shape check but does not exist simply yields an
/// empty search.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Isbn(String);

impl Isbn {
    /// Strips separators and validates the ISBN shape.
    pub fn parse(raw: &str) -> Result<Self, IsbnError> {
        let cleaned = Self::clean(raw);
        if Self::is_valid(&cleaned) {
            Ok(Self(cleaned))
        } else {
            Err(IsbnError)
        }
    }

    /// Removes hyphens and spaces without validating.
    pub fn clean(raw: &str) -> String {
        raw.chars().filter(|c| *c != '-' && *c != ' ').collect()
    }

    fn is_valid(isbn: &str) -> bool {
        let bytes = isbn.as_bytes();
        match bytes.len() {
            13 => {
                bytes.iter().all(u8::is_ascii_digit)
                    && (isbn.starts_with("978") || isbn.starts_with("979"))
            }
            10 => {
                bytes[..9].iter().all(u8::is_ascii_digit)
                    && (bytes[9].is_ascii_digit() || bytes[9] == b'X')
            }
            _ => false,
        }
    }

    /// Returns the normalized ISBN string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Isbn {
    type Err = IsbnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Isbn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Which offer on the product page the price was taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceCategory {
    /// Dedicated used-copies block.
    Used,
    /// "More buying choices" / third-party sellers.
    Marketplace,
    /// Generic primary price display.
    General,
}

impl fmt::Display for PriceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PriceCategory::Used => write!(f, "used"),
            PriceCategory::Marketplace => write!(f, "marketplace"),
            PriceCategory::General => write!(f, "general"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Availability {
    Available,
}

impl fmt::Display for Availability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Availability::Available => write!(f, "available"),
        }
    }
}

/// A single price found for an ISBN.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceResult {
    /// Price in whole yen
    pub amount: u64,
    /// Always "JPY"
    pub currency: String,
    pub availability: Availability,
    /// Offer the price was taken from
    pub category: PriceCategory,
}

impl PriceResult {
    /// Creates an available JPY price for the given category.
    pub fn new(amount: u64, category: PriceCategory) -> Self {
        Self {
            amount,
            currency: CURRENCY.to_string(),
            availability: Availability::Available,
            category,
        }
    }
}

/// Per-ISBN outcome as reported to users: a price or an error message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceReport {
    pub isbn: String,
    pub price: Option<u64>,
    pub currency: String,
    pub availability: Option<Availability>,
    pub category: Option<PriceCategory>,
    pub error: Option<String>,
}

impl PriceReport {
    /// Report for a found price.
    pub fn found(isbn: impl Into<String>, price: &PriceResult) -> Self {
        Self {
            isbn: isbn.into(),
            price: Some(price.amount),
            currency: price.currency.clone(),
            availability: Some(price.availability),
            category: Some(price.category),
            error: None,
        }
    }

    /// Report for a lookup that produced no price.
    pub fn failed(isbn: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            isbn: isbn.into(),
            price: None,
            currency: CURRENCY.to_string(),
            availability: None,
            category: None,
            error: Some(error.into()),
        }
    }

    pub fn is_found(&self) -> bool {
        self.price.is_some()
    }
}
