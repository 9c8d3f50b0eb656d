//! # bpkit HTTP API Module
//!
//! This module implements the HTTP REST API server using axum.
//!
//! ## Endpoints
//!
//! - `GET /health` - Health check
//! - `POST /decode` - Exchange string to document
//! - `POST /encode` - Document to exchange string
//! - `POST /inspect` - Blueprint summary
//! - `POST /pack` - Pack values into a constant combinator
//!
//! ## Configuration (Environment Variables)
//!
//! - `BPKIT_CORS_ORIGINS`: Comma-separated list of allowed origins, or "*" for all (default: localhost only)

mod handlers;
mod types;

// Re-export handlers and types for integration tests (via `bpkit::api::*`)
pub use handlers::{
    ApiResult, decode_handler, encode_handler, health_handler, inspect_handler, pack_handler,
};
pub use types::{
    DecodeResponse, EncodeRequest, EncodeResponse, ErrorResponse, ExchangeRequest,
    HealthResponse, InspectResponse, PackRequest, PackResponse, status_for,
};

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    routing::{get, post},
};
use bpkit_core::{BlueprintError, SignalCatalog};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Maximum request body size (80 MB), enough for the longest exchange string
/// accepted by the codec.
const MAX_REQUEST_BODY: usize = 80 * 1024 * 1024;

// =============================================================================
// SERVER STATE
// =============================================================================

/// Shared server state: the signal catalog, read-only.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<SignalCatalog>,
}

impl AppState {
    /// Create new app state with a catalog.
    #[must_use]
    pub fn new(catalog: SignalCatalog) -> Self {
        Self {
            catalog: Arc::new(catalog),
        }
    }
}

// =============================================================================
// CORS CONFIGURATION
// =============================================================================

/// Build CORS layer from `BPKIT_CORS_ORIGINS`.
///
/// - `*`: allows all origins
/// - not set: localhost only
/// - otherwise: comma-separated list of allowed origins
fn build_cors_layer() -> CorsLayer {
    let origins_env = std::env::var("BPKIT_CORS_ORIGINS").ok();

    match origins_env.as_deref() {
        Some("*") => {
            tracing::warn!("CORS: Allowing ALL origins (BPKIT_CORS_ORIGINS=*)");
            CorsLayer::permissive()
        }
        Some(origins) => {
            let allowed: Vec<HeaderValue> = origins
                .split(',')
                .filter_map(|s| {
                    let trimmed = s.trim();
                    match trimmed.parse::<HeaderValue>() {
                        Ok(hv) => Some(hv),
                        Err(e) => {
                            tracing::warn!("CORS: Invalid origin '{}': {}", trimmed, e);
                            None
                        }
                    }
                })
                .collect();

            if allowed.is_empty() {
                tracing::warn!("CORS: No valid origins in BPKIT_CORS_ORIGINS, using localhost only");
                build_localhost_cors()
            } else {
                restricted_cors(allowed)
            }
        }
        None => build_localhost_cors(),
    }
}

fn build_localhost_cors() -> CorsLayer {
    let origins: Vec<HeaderValue> = [
        "http://localhost:3000",
        "http://localhost:8080",
        "http://127.0.0.1:3000",
        "http://127.0.0.1:8080",
    ]
    .into_iter()
    .filter_map(|o| o.parse::<HeaderValue>().ok())
    .collect();
    restricted_cors(origins)
}

fn restricted_cors(origins: Vec<HeaderValue>) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}

// =============================================================================
// ROUTER CREATION
// =============================================================================

/// Create the axum router with all endpoints and middleware.
///
/// Layers (outer to inner): tracing, CORS, body limit.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_handler))
        .route("/decode", post(handlers::decode_handler))
        .route("/encode", post(handlers::encode_handler))
        .route("/inspect", post(handlers::inspect_handler))
        .route("/pack", post(handlers::pack_handler))
        .layer(axum::extract::DefaultBodyLimit::max(MAX_REQUEST_BODY))
        .layer(build_cors_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// =============================================================================
// SERVER STARTUP
// =============================================================================

/// Start the HTTP server.
pub async fn run_server(addr: &str, catalog: SignalCatalog) -> Result<(), BlueprintError> {
    let router = create_router(AppState::new(catalog));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| BlueprintError::Io(format!("Bind failed: {}", e)))?;

    tracing::info!("bpkit HTTP server listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| BlueprintError::Io(format!("Server error: {}", e)))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Cannot listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
