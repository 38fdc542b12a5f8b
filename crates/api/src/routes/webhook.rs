use axum::routing::post;
use axum::Router;

use crate::handlers::webhook;
use crate::state::AppState;

/// Provider callbacks, mounted at the root. The path must match
/// [`stager_pipeline::orchestrator::CALLBACK_PATH`].
pub fn router() -> Router<AppState> {
    Router::new().route("/webhook/reimaginehome/{id}", post(webhook::receive))
}
