//! Generation endpoints: POST /api/generate, POST /api/generate_stream

use std::sync::Arc;

use axum::{
    extract::{State, rejection::JsonRejection},
    response::Json,
};
use netmotif_events::SessionId;
use netmotif_graph::{DirectedGraph, GenerationStrategy, GraphData, GraphGenerator, Silent};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::GraphResponse;
use crate::error::Result;
use crate::jobs::{generate_with_metrics, start_generation};
use crate::state::AppState;

/// Request payload for both generation modes
#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    pub original_graph: GraphData,
    /// Streaming only; assigned when absent
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub strategy: Option<GenerationStrategy>,
}

/// Immediate acknowledgement of a streaming job
#[derive(Debug, Serialize)]
pub struct StreamStartedResponse {
    pub success: bool,
    pub session_id: String,
}

/// POST /api/generate - Generate and return the graph in one response
pub async fn generate(
    State(state): State<AppState>,
    payload: std::result::Result<Json<GenerateRequest>, JsonRejection>,
) -> Result<Json<GraphResponse>> {
    let Json(request) = payload?;
    let original = DirectedGraph::try_from(request.original_graph)?;
    let config = state.generator_config(request.seed, request.strategy);
    config.validate()?;

    let generator = GraphGenerator::new(config);
    let (graph, metrics) = tokio::task::spawn_blocking(move || {
        generate_with_metrics(&generator, &original, &mut Silent)
    })
    .await??;

    Ok(Json(GraphResponse::new(graph, metrics)))
}

/// POST /api/generate_stream - Start a generation job
///
/// The request is fully validated before the job exists; progress and the
/// result are delivered to `/ws` subscribers of the returned session.
pub async fn generate_stream(
    State(state): State<AppState>,
    payload: std::result::Result<Json<GenerateRequest>, JsonRejection>,
) -> Result<Json<StreamStartedResponse>> {
    let Json(request) = payload?;
    let session_id = request
        .session_id
        .map(SessionId::parse)
        .transpose()?
        .unwrap_or_else(SessionId::generate);
    let original = DirectedGraph::try_from(request.original_graph)?;
    let config = state.generator_config(request.seed, request.strategy);
    config.validate()?;

    info!(
        session_id = %session_id,
        nodes = original.node_count(),
        edges = original.edge_count(),
        strategy = ?config.strategy,
        "Starting streaming generation"
    );
    start_generation(
        Arc::clone(&state.notifier),
        session_id.clone(),
        original,
        config,
    )
    .await;

    Ok(Json(StreamStartedResponse {
        success: true,
        session_id: session_id.to_string(),
    }))
}
