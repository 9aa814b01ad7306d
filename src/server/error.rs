use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::server::dto::ErrorResponse;

/// Errors returned by route handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid ISBN format")]
    InvalidIsbn,

    #[error("Price information not found")]
    PriceNotFound,

    #[error("Maximum {0} ISBNs per request")]
    BatchTooLarge(usize),

    #[error("The requested resource was not found")]
    RouteNotFound,

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type) = match &self {
            ApiError::InvalidIsbn | ApiError::BatchTooLarge(_) => {
                (StatusCode::BAD_REQUEST, "validation_error")
            }
            ApiError::PriceNotFound | ApiError::RouteNotFound => (StatusCode::NOT_FOUND, "not_found"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        };

        let body = ErrorResponse { error: error_type.to_string(), message: self.to_string() };

        (status, axum::Json(body)).into_response()
    }
}
