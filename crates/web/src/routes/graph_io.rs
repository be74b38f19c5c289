//! Graph exchange endpoints: POST /api/import, POST /api/download, GET /api/sample

use axum::{
    extract::{
        Query,
        rejection::{JsonRejection, QueryRejection},
    },
    http::header,
    response::{IntoResponse, Json, Response},
};
use netmotif_graph::{
    DirectedGraph, GraphData, compute_metrics, parse_edge_list, sample_graph, write_edge_list,
};
use serde::Deserialize;
use tracing::debug;

use super::GraphResponse;
use crate::error::{AppError, Result};

/// Download formats
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Edge list, one `source target` pair per line
    #[default]
    Txt,
    Json,
}

impl ExportFormat {
    const fn extension(self) -> &'static str {
        match self {
            Self::Txt => "txt",
            Self::Json => "json",
        }
    }

    const fn content_type(self) -> &'static str {
        match self {
            Self::Txt => "text/plain; charset=utf-8",
            Self::Json => "application/json",
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct DownloadRequest {
    pub graph: GraphData,
    #[serde(default)]
    pub format: ExportFormat,
}

#[derive(Debug, Deserialize)]
pub struct SampleQuery {
    #[serde(default)]
    pub seed: Option<u64>,
}

/// POST /api/import - Parse an edge-list body into a graph
pub async fn import(body: String) -> Result<Json<GraphResponse>> {
    let (graph, metrics) = tokio::task::spawn_blocking(move || {
        let graph = parse_edge_list(&body)?;
        let metrics = compute_metrics(&graph);
        Ok::<_, netmotif_core::Error>((GraphData::from(&graph), metrics))
    })
    .await??;
    debug!(nodes = metrics.num_nodes, edges = metrics.num_edges, "Imported edge list");

    Ok(Json(GraphResponse::new(graph, metrics)))
}

/// POST /api/download - Export a graph as `generated_graph.<format>`
pub async fn download(
    payload: std::result::Result<Json<DownloadRequest>, JsonRejection>,
) -> Result<Response> {
    let Json(request) = payload?;
    let graph = DirectedGraph::try_from(request.graph)?;
    let format = request.format;

    let body = match format {
        ExportFormat::Txt => write_edge_list(&graph)?,
        ExportFormat::Json => serde_json::to_string_pretty(&GraphData::from(&graph))
            .map_err(|e| AppError::Internal(format!("failed to serialize graph: {e}")))?,
    };
    let disposition = format!(
        "attachment; filename=\"generated_graph.{}\"",
        format.extension()
    );

    Ok((
        [
            (header::CONTENT_TYPE, format.content_type().to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}

/// GET /api/sample - Built-in 20-node sample graph
pub async fn sample(
    query: std::result::Result<Query<SampleQuery>, QueryRejection>,
) -> Result<Json<GraphResponse>> {
    let Query(query) = query?;
    let (graph, metrics) = tokio::task::spawn_blocking(move || {
        let graph = sample_graph(query.seed);
        let metrics = compute_metrics(&graph);
        (GraphData::from(&graph), metrics)
    })
    .await?;

    Ok(Json(GraphResponse::new(graph, metrics)))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    #![allow(clippy::indexing_slicing, clippy::arithmetic_side_effects)]

    use super::*;

    #[test]
    fn test_format_parsing() {
        let txt: DownloadRequest =
            serde_json::from_str(r#"{"graph":{"nodes":[],"edges":[]}}"#).unwrap();
        assert_eq!(txt.format, ExportFormat::Txt);

        let json: DownloadRequest =
            serde_json::from_str(r#"{"graph":{"nodes":[],"edges":[]},"format":"json"}"#).unwrap();
        assert_eq!(json.format, ExportFormat::Json);

        let unknown = serde_json::from_str::<DownloadRequest>(
            r#"{"graph":{"nodes":[],"edges":[]},"format":"xml"}"#,
        );
        assert!(unknown.is_err());
    }

    #[test]
    fn test_format_headers() {
        assert_eq!(ExportFormat::Json.extension(), "json");
        assert!(ExportFormat::Txt.content_type().starts_with("text/plain"));
    }
}
