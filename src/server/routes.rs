use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use tracing::{error, info};

use crate::commands::lookup_reports;
use crate::server::dto::{
    EndpointMap, HealthResponse, InfoResponse, PriceReport, RootResponse, API_NAME,
};
use crate::server::error::ApiError;
use crate::server::state::AppState;
use crate::storefront::Isbn;

/// Build the full router with all routes.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/api/info", get(info))
        .route("/api/amazon-price/{isbn}", get(amazon_price))
        .route("/api/amazon-prices", post(amazon_prices))
        .fallback(not_found)
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Meta
// ---------------------------------------------------------------------------

pub async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        message: API_NAME.to_string(),
        health: "/health".to_string(),
        info: "/api/info".to_string(),
    })
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        message: format!("{} is running", API_NAME),
    })
}

pub async fn info(State(state): State<Arc<AppState>>) -> Json<InfoResponse> {
    Json(InfoResponse {
        name: API_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        description: "Used-book price lookup by ISBN".to_string(),
        endpoints: EndpointMap {
            health: "/health".to_string(),
            amazon_price: "/api/amazon-price/{isbn}".to_string(),
            amazon_prices_batch: "/api/amazon-prices".to_string(),
            api_info: "/api/info".to_string(),
        },
        supported_isbn_formats: vec!["ISBN-10".to_string(), "ISBN-13".to_string()],
        max_batch_size: state.max_batch,
    })
}

async fn not_found() -> ApiError {
    ApiError::RouteNotFound
}

// ---------------------------------------------------------------------------
// Prices
// ---------------------------------------------------------------------------

pub async fn amazon_price(
    State(state): State<Arc<AppState>>,
    Path(isbn): Path<String>,
) -> Result<Json<PriceReport>, ApiError> {
    let isbn = Isbn::parse(&isbn).map_err(|_| ApiError::InvalidIsbn)?;

    info!("Fetching price for ISBN: {}", isbn);

    match state.source.lookup(&isbn).await {
        Ok(Some(price)) => Ok(Json(PriceReport::found(isbn.as_str(), &price))),
        Ok(None) => Err(ApiError::PriceNotFound),
        Err(e) => {
            error!("Error fetching price for {}: {:#}", isbn, e);
            Err(ApiError::Internal(e.to_string()))
        }
    }
}

pub async fn amazon_prices(
    State(state): State<Arc<AppState>>,
    Json(isbns): Json<Vec<String>>,
) -> Result<Json<Vec<PriceReport>>, ApiError> {
    if isbns.len() > state.max_batch {
        return Err(ApiError::BatchTooLarge(state.max_batch));
    }

    let reports = lookup_reports(state.source.as_ref(), &isbns).await;
    Ok(Json(reports))
}
