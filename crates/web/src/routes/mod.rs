//! REST API routes
//!
//! ## Route Structure
//!
//! - `POST /api/analyze` - Triad census of a graph
//! - `POST /api/metrics` - Structural metrics of a graph
//! - `POST /api/generate` - Generate a random graph and wait for it
//! - `POST /api/generate_stream` - Start a generation job, results arrive on `/ws`
//! - `POST /api/import` - Parse an edge-list body
//! - `POST /api/download` - Export a graph as an attachment
//! - `GET /api/sample` - Built-in random sample graph
//! - `GET /api/sessions/{id}` - Status of a generation session
//! - `GET /ws` - WebSocket event channel
//! - `GET /health` - Liveness probe
//!
//! Handlers validate the whole request before any computation starts and
//! run CPU-bound work on the blocking pool.

use axum::{
    Router,
    routing::{get, post},
};
use netmotif_graph::{GraphData, MetricsReport};
use serde::Serialize;

use crate::state::AppState;

pub mod analyze;
pub mod generate;
pub mod graph_io;
pub mod health;
pub mod sessions;
pub mod websocket;

/// Response carrying a graph together with its metrics.
#[derive(Debug, Serialize)]
pub struct GraphResponse {
    pub success: bool,
    pub graph: GraphData,
    pub metrics: MetricsReport,
}

impl GraphResponse {
    pub fn new(graph: GraphData, metrics: MetricsReport) -> Self {
        Self {
            success: true,
            graph,
            metrics,
        }
    }
}

/// Assemble every route; state is attached by the caller.
pub fn api_router() -> Router<AppState> {
    let api_routes = Router::new()
        .route("/analyze", post(analyze::analyze))
        .route("/metrics", post(analyze::metrics))
        .route("/generate", post(generate::generate))
        .route("/generate_stream", post(generate::generate_stream))
        .route("/import", post(graph_io::import))
        .route("/download", post(graph_io::download))
        .route("/sample", get(graph_io::sample))
        .route("/sessions/{id}", get(sessions::session_status));

    Router::new()
        .nest("/api", api_routes)
        .route("/ws", get(websocket::websocket_handler))
        .route("/health", get(health::health_check))
}
