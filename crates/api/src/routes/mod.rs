pub mod health;
pub mod images;
pub mod staging;
pub mod webhook;

use axum::routing::post;
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Build the `/api` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /upload-image                 host a photo (POST)
///
/// /stage                        submit a staging job (POST)
/// /check-job/{id}               poll a job
/// /jobs/{id}                    full job record
/// /jobs/{id}/cancel             cancel a job (POST)
/// /recent-stagings              recently completed jobs
/// /catalogue                    space types and design themes
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/upload-image", post(handlers::images::upload_image))
        .merge(staging::router())
}
