use axum::routing::{get, post};
use axum::Router;

use crate::handlers::staging;
use crate::state::AppState;

/// Staging job routes, mounted under `/api`.
///
/// ```text
/// POST   /stage                 -> stage
/// GET    /check-job/{id}        -> check_job
/// GET    /jobs/{id}             -> get_job
/// POST   /jobs/{id}/cancel      -> cancel_job
/// GET    /recent-stagings       -> recent_stagings
/// GET    /catalogue             -> catalogue
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/stage", post(staging::stage))
        .route("/check-job/{id}", get(staging::check_job))
        .route("/jobs/{id}", get(staging::get_job))
        .route("/jobs/{id}/cancel", post(staging::cancel_job))
        .route("/recent-stagings", get(staging::recent_stagings))
        .route("/catalogue", get(staging::catalogue))
}
