//! Netmotif Web Server
//!
//! HTTP API and WebSocket event channel for graph analysis and
//! generation, with tower middleware for CORS, tracing, and compression.

#![forbid(unsafe_code)]

use std::sync::Arc;

use axum::{
    Router,
    http::{HeaderValue, Method},
};
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

pub mod config;
pub mod error;
pub mod jobs;
pub mod routes;
pub mod state;

pub use config::{Config, JobsConfig, ServerConfig};
pub use error::{AppError, ErrorResponse};
pub use state::AppState;

/// Create the application router with middleware.
///
/// # Errors
///
/// Returns [`Error::InvalidHeader`] if the configured CORS origin is not a
/// valid header value.
pub fn create_router(state: AppState, server: &ServerConfig) -> Result<Router, Error> {
    info!("Creating router with CORS origin: {}", server.cors_origin);

    let origin = if server.cors_origin == "*" {
        AllowOrigin::from(Any)
    } else {
        AllowOrigin::exact(server.cors_origin.parse::<HeaderValue>()?)
    };
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    let router = routes::api_router().with_state(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CompressionLayer::new())
            .layer(cors),
    );

    Ok(router)
}

/// Bind, start the session sweeper and serve until the process stops.
///
/// # Errors
///
/// Returns an error if the router cannot be built or the address cannot
/// be bound.
pub async fn serve(config: Config) -> Result<(), Error> {
    let state = AppState::new(&config);
    let router = create_router(state.clone(), &config.server)?;
    let sweeper = jobs::spawn_session_sweeper(Arc::clone(&state.notifier), &config.jobs);

    let listener = tokio::net::TcpListener::bind(&config.server.bind_address).await?;
    info!("Listening on http://{}", listener.local_addr()?);

    let result = axum::serve(listener, router).await;
    sweeper.abort();
    result.map_err(Error::from)
}

/// Web server errors.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid header value
    #[error("Invalid header value: {0}")]
    InvalidHeader(#[from] axum::http::header::InvalidHeaderValue),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
