//! Request failures for storefront fetches.

use thiserror::Error;

/// Why a single storefront request produced no usable body.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Failed to send request: {0}")]
    Transport(#[source] wreq::Error),

    #[error("Rate limited by the storefront (503). Try increasing the delay or using a proxy.")]
    RateLimited,

    #[error("Request failed with status: {0}")]
    Status(u16),

    #[error("Failed to read response body: {0}")]
    Body(#[source] wreq::Error),
}

impl FetchError {
    /// Returns the HTTP status behind the failure, if one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::RateLimited => Some(503),
            FetchError::Status(code) => Some(*code),
            FetchError::Transport(_) | FetchError::Body(_) => None,
        }
    }
}
