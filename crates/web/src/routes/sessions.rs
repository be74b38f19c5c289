//! Session endpoint: GET /api/sessions/{id}

use axum::{
    extract::{Path, State},
    response::Json,
};
use netmotif_events::{JobStatus, SessionId};

use crate::error::{AppError, Result};
use crate::state::AppState;

/// GET /api/sessions/{id} - Snapshot of a generation session
pub async fn session_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<JobStatus>> {
    let session_id = SessionId::parse(id)?;
    state
        .notifier
        .job_status(&session_id)
        .await
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Session not found: {session_id}")))
}
