//! Generation event types, as sent over the WebSocket.

use netmotif_graph::{GraphData, MetricsReport, Progress};
use serde::{Deserialize, Serialize};

use crate::types::SessionId;

/// Events published for one generation session.
///
/// Serialized with a `type` tag: `generation_progress`,
/// `generation_complete` or `generation_error`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GenerationEvent {
    /// Edges placed so far.
    GenerationProgress {
        session_id: String,
        /// Percentage in `0..=100`, two decimals
        progress: f64,
        current: usize,
        total: usize,
    },
    /// The generated graph and its metrics (terminal).
    GenerationComplete {
        session_id: String,
        success: bool,
        graph: GraphData,
        metrics: MetricsReport,
    },
    /// Generation failed (terminal).
    GenerationError { session_id: String, error: String },
}

impl GenerationEvent {
    pub fn progress(session_id: &SessionId, progress: Progress) -> Self {
        Self::GenerationProgress {
            session_id: session_id.to_string(),
            progress: progress.percentage(),
            current: progress.current,
            total: progress.total,
        }
    }

    pub fn complete(session_id: &SessionId, graph: GraphData, metrics: MetricsReport) -> Self {
        Self::GenerationComplete {
            session_id: session_id.to_string(),
            success: true,
            graph,
            metrics,
        }
    }

    pub fn error(session_id: &SessionId, error: impl Into<String>) -> Self {
        Self::GenerationError {
            session_id: session_id.to_string(),
            error: error.into(),
        }
    }

    /// Get the event type as a string.
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::GenerationProgress { .. } => "generation_progress",
            Self::GenerationComplete { .. } => "generation_complete",
            Self::GenerationError { .. } => "generation_error",
        }
    }

    pub fn session_id(&self) -> &str {
        match self {
            Self::GenerationProgress { session_id, .. }
            | Self::GenerationComplete { session_id, .. }
            | Self::GenerationError { session_id, .. } => session_id,
        }
    }

    /// Complete and error events end a job.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::GenerationProgress { .. })
    }
}
