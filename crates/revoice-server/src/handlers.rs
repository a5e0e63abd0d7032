use std::sync::Arc;

use axum::{Json, body::Bytes, extract::State};
use http::StatusCode;
use revoice_pipeline::{Pipeline, PipelineError, PipelineOutcome, ValidationError};

/// Run one job synchronously and answer with its outcome
///
/// Always answers `200`: failures are reported in the outcome body, including
/// bodies that are not JSON at all.
pub async fn run_job(State(pipeline): State<Arc<Pipeline>>, body: Bytes) -> Json<PipelineOutcome> {
    let outcome = match serde_json::from_slice(&body) {
        Ok(event) => pipeline.handle_event(event).await,
        Err(e) => {
            tracing::warn!("rejected request body: {e}");
            PipelineError::from(ValidationError::Malformed(e.to_string())).into()
        }
    };

    Json(outcome)
}

/// Liveness probe; answers as long as the process can serve requests
pub async fn health() -> (StatusCode, &'static str) {
    (StatusCode::OK, "ok")
}
