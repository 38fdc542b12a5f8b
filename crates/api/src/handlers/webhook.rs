//! Provider callback endpoint.
//!
//! The provider retries callbacks that are not acknowledged, so this
//! handler answers `{"status": "success"}` whatever happens and reports in
//! `received` whether the payload was applied to a known job.

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::Json;
use stager_core::types::JobId;
use stager_pipeline::CallbackOutcome;

use crate::response::WebhookAck;
use crate::state::AppState;

/// POST /webhook/reimaginehome/{id}
pub async fn receive(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
    body: Bytes,
) -> Json<WebhookAck> {
    let job_id = JobId::from(job_id);

    let payload: serde_json::Value = match serde_json::from_slice(&body) {
        Ok(payload) => payload,
        Err(e) => {
            tracing::warn!(job_id = %job_id, error = %e, "Unparseable callback body");
            return ack(false);
        }
    };

    match state.orchestrator.receive_callback(&job_id, &payload).await {
        Ok(CallbackOutcome::Applied(_)) | Ok(CallbackOutcome::AlreadyTerminal(_)) => ack(true),
        Ok(CallbackOutcome::Ignored) => ack(false),
        Err(e) => {
            tracing::error!(job_id = %job_id, error = %e, "Failed to apply callback");
            ack(false)
        }
    }
}

fn ack(received: bool) -> Json<WebhookAck> {
    Json(WebhookAck {
        status: "success",
        received,
    })
}
