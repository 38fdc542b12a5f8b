use axum::routing::get;
use axum::Router;

use crate::handlers::images;
use crate::state::AppState;

/// Self-hosted image route, mounted at the root so the URLs handed to the
/// provider stay short.
pub fn router() -> Router<AppState> {
    Router::new().route("/image/{id}", get(images::serve_image))
}
