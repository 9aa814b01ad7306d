use serde::{Deserialize, Serialize};

pub use crate::storefront::PriceReport;

pub const API_NAME: &str = "Book Price API";

#[derive(Debug, Serialize, Deserialize)]
pub struct RootResponse {
    pub message: String,
    pub health: String,
    pub info: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EndpointMap {
    pub health: String,
    pub amazon_price: String,
    pub amazon_prices_batch: String,
    pub api_info: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct InfoResponse {
    pub name: String,
    pub version: String,
    pub description: String,
    pub endpoints: EndpointMap,
    pub supported_isbn_formats: Vec<String>,
    pub max_batch_size: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}
