use crate::storefront::PriceSource;
use std::sync::Arc;

/// Shared application state, available to all route handlers via `State<Arc<AppState>>`.
pub struct AppState {
    pub source: Arc<dyn PriceSource>,
    /// Largest batch accepted by the batch endpoint.
    pub max_batch: usize,
}

impl AppState {
    pub fn new(source: Arc<dyn PriceSource>, max_batch: usize) -> Self {
        Self { source, max_batch }
    }
}
