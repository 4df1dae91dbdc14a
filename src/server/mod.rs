//! HTTP server for the chat summary API.
//!
//! Provides REST endpoints for:
//! - Conversation summaries (`POST /summarize`)
//! - Liveness (`GET /health`)

pub mod error;
pub mod extract;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::create_router;
pub use state::AppState;

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::http::HeaderValue;
use tower_http::cors::{AllowCredentials, AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::config::AppConfig;

/// Header used to correlate a request across logs.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// CORS policy allowing a single browser origin, with credentials.
///
/// Only a request whose `Origin` matches gets `access-control-allow-origin`
/// and `access-control-allow-credentials`. Credentials rule out `*`, so methods
/// and headers are mirrored from the preflight request instead.
///
/// # Errors
/// Returns an error if the origin is not a valid header value.
pub fn cors_layer(allowed_origin: &str) -> Result<CorsLayer, axum::http::header::InvalidHeaderValue> {
    let origin = HeaderValue::from_str(allowed_origin)?;
    let credentials_origin = origin.clone();
    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list([origin]))
        .allow_credentials(AllowCredentials::predicate(move |request_origin, _| {
            *request_origin == credentials_origin
        }))
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request()))
}

/// Build the full application: routes plus CORS, tracing and request-id layers.
///
/// # Errors
/// Returns an error if the configured origin is invalid.
pub fn build_app(
    state: Arc<AppState>,
    config: &AppConfig,
) -> Result<Router, Box<dyn std::error::Error + Send + Sync>> {
    let cors = cors_layer(&config.allowed_origin)
        .map_err(|e| format!("invalid allowed origin {:?}: {e}", config.allowed_origin))?;

    Ok(create_router(state)
        .layer(cors)
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid)))
}

/// Start the HTTP server.
///
/// # Errors
/// Returns an error if the server fails to start.
pub async fn run_server(state: Arc<AppState>, config: &AppConfig) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    run_server_with_shutdown(state, config, std::future::pending()).await
}

/// Start the HTTP server with graceful shutdown support.
///
/// The server will stop accepting new connections when `shutdown_signal` completes.
///
/// # Errors
/// Returns an error if the server fails to start.
pub async fn run_server_with_shutdown<F>(
    state: Arc<AppState>,
    config: &AppConfig,
    shutdown_signal: F,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = build_app(state, config)?;

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Chat summary server listening on http://{addr}");
    tracing::info!("Allowed origin: {}", config.allowed_origin);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    Ok(())
}
