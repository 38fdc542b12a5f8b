use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

/// Health check response payload.
#[derive(Serialize)]
pub struct HealthResponse {
    /// `ok`, or `degraded` when staging cannot run.
    pub status: &'static str,
    /// Crate version from Cargo.toml.
    pub version: &'static str,
    /// Whether a staging provider API key is configured.
    pub api_configured: bool,
    /// Image hosts in rank order.
    pub image_hosts: Vec<&'static str>,
    /// Jobs currently masking or awaiting submission.
    pub active_jobs: usize,
}

/// GET /health -- returns service health.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let api_configured = state.config.api_configured();
    let image_hosts = state.hosts.host_names();

    let status = if api_configured && !image_hosts.is_empty() {
        "ok"
    } else {
        "degraded"
    };

    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        api_configured,
        image_hosts,
        active_jobs: state.orchestrator.active_jobs().await,
    })
}

/// Mount health check routes (root level, not under `/api`).
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
