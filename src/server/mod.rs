//! REST gateway exposing price lookups over HTTP.

pub mod dto;
pub mod error;
pub mod routes;
pub mod state;

use crate::config::Config;
use crate::storefront::{PriceLookup, PriceSource};
use anyhow::{Context, Result};
use axum::http::{HeaderValue, Method};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use state::AppState;

/// Builds the CORS policy for the configured origins. Invalid origins are skipped.
///
/// A `*` entry mirrors the request origin, since a literal wildcard cannot be
/// combined with credentials.
pub fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let allow_origin = if allowed_origins.iter().any(|origin| origin == "*") {
        warn!("CORS allows any origin (mirroring the request origin)");
        AllowOrigin::mirror_request()
    } else {
        let origins: Vec<HeaderValue> = allowed_origins
            .iter()
            .filter_map(|origin| match HeaderValue::from_str(origin) {
                Ok(value) => Some(value),
                Err(_) => {
                    warn!("Ignoring invalid CORS origin: {}", origin);
                    None
                }
            })
            .collect();
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

/// Runs the gateway until Ctrl-C, then closes the lookup session.
pub async fn run(config: Config) -> Result<()> {
    let pipeline =
        Arc::new(PriceLookup::new(&config).context("Failed to create lookup pipeline")?);
    let source: Arc<dyn PriceSource> = pipeline.clone();

    let state = Arc::new(AppState::new(source, config.max_batch));
    let app = routes::router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&config.allowed_origins));

    let addr = config.bind_addr();
    let listener =
        TcpListener::bind(&addr).await.with_context(|| format!("Failed to bind {}", addr))?;

    info!("Starting Book Price API on {}", addr);
    let served = axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await;

    info!("Shutting down Book Price API");
    pipeline.shutdown().await;

    served.context("Server error")
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
