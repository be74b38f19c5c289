//! Analysis endpoints: POST /api/analyze, POST /api/metrics

use axum::{extract::rejection::JsonRejection, response::Json};
use netmotif_graph::{
    DirectedGraph, GraphData, MetricsReport, MotifCount, compute_metrics, triad_census,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;

/// Request payload carrying one graph
#[derive(Debug, Deserialize)]
pub struct GraphRequest {
    pub graph: GraphData,
}

/// Census response: one row per triad class, in id order
#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub success: bool,
    pub total_motifs: u64,
    pub motifs: Vec<MotifCount>,
}

#[derive(Debug, Serialize)]
pub struct MetricsResponse {
    pub success: bool,
    pub metrics: MetricsReport,
}

/// POST /api/analyze - Triad census
pub async fn analyze(
    payload: std::result::Result<Json<GraphRequest>, JsonRejection>,
) -> Result<Json<AnalyzeResponse>> {
    let Json(request) = payload?;
    let graph = DirectedGraph::try_from(request.graph)?;
    debug!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "Computing triad census"
    );

    let census = tokio::task::spawn_blocking(move || triad_census(&graph)).await?;

    Ok(Json(AnalyzeResponse {
        success: true,
        total_motifs: census.total(),
        motifs: census.entries().collect(),
    }))
}

/// POST /api/metrics - Structural metrics
pub async fn metrics(
    payload: std::result::Result<Json<GraphRequest>, JsonRejection>,
) -> Result<Json<MetricsResponse>> {
    let Json(request) = payload?;
    let graph = DirectedGraph::try_from(request.graph)?;
    debug!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "Computing metrics"
    );

    let metrics = tokio::task::spawn_blocking(move || compute_metrics(&graph)).await?;

    Ok(Json(MetricsResponse {
        success: true,
        metrics,
    }))
}
