//! Photo upload and the self host's image route.

use axum::extract::{Path, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use stager_core::error::CoreError;

use crate::error::{AppError, AppResult};
use crate::response::UploadResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct UploadRequest {
    /// Data URL (or bare base64) of the photo.
    pub image: Option<String>,
}

/// POST /api/upload-image
///
/// Pushes the photo through the host chain and returns its public URL.
pub async fn upload_image(
    State(state): State<AppState>,
    Json(input): Json<UploadRequest>,
) -> AppResult<Json<UploadResponse>> {
    let image = input
        .image
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| CoreError::Validation("No image provided".into()))?;

    let hosted = state.hosts.resolve(&image).await?;

    Ok(Json(UploadResponse {
        success: true,
        image_url: hosted.url,
        host: hosted.host,
    }))
}

/// GET /image/{id}
pub async fn serve_image(
    State(state): State<AppState>,
    Path(image_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let image = state
        .image_cache
        .get(&image_id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("image {image_id} not found")))?;

    let headers = [
        (header::CONTENT_TYPE, image.content_type.clone()),
        (header::CACHE_CONTROL, "public, max-age=3600".to_string()),
    ];
    Ok((headers, image.bytes))
}
