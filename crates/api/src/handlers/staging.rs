//! Handlers for staging jobs and the catalogue.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use stager_core::catalogue::{self, DESIGN_THEMES, SPACE_TYPES};
use stager_core::error::CoreError;
use stager_core::staging::{JobView, StagingJob, StagingParams};
use stager_core::types::JobId;

use crate::error::AppResult;
use crate::response::{
    CatalogueResponse, RecentStaging, RecentStagingsResponse, StageResponse,
};
use crate::state::AppState;

/// Default number of entries in `GET /api/recent-stagings`.
const DEFAULT_RECENT_LIMIT: usize = 5;
const MAX_RECENT_LIMIT: usize = 50;

// ---------------------------------------------------------------------------
// Submit
// ---------------------------------------------------------------------------

/// Request body for `POST /api/stage`.
///
/// The photo is given either as a public URL or as a data URL; `image` is
/// the field name the upload form uses.
#[derive(Debug, Deserialize)]
pub struct StageRequest {
    pub image_url: Option<String>,
    pub image: Option<String>,
    pub space_type: Option<String>,
    pub design_theme: Option<String>,
}

/// POST /api/stage
///
/// Hosts the photo if needed, records a job and returns 202 straight away.
/// Masking and generation continue in the background.
pub async fn stage(
    State(state): State<AppState>,
    Json(input): Json<StageRequest>,
) -> AppResult<impl IntoResponse> {
    if !state.config.api_configured() {
        return Err(CoreError::Upstream("staging provider API key is not configured".into()).into());
    }

    let params = StagingParams::new(input.space_type, input.design_theme)?;
    let present = |s: &String| !s.trim().is_empty();
    let source = input
        .image_url
        .filter(present)
        .or_else(|| input.image.filter(present))
        .ok_or_else(|| CoreError::Validation("image or image_url is required".into()))?;

    let hosted = state.hosts.resolve(&source).await?;
    let job = state.orchestrator.submit(&hosted.url, params).await?;

    Ok((
        StatusCode::ACCEPTED,
        Json(StageResponse {
            success: true,
            job_id: job.id,
            status: job.status,
            image_url: hosted.url,
        }),
    ))
}

// ---------------------------------------------------------------------------
// Query
// ---------------------------------------------------------------------------

/// GET /api/check-job/{id}
pub async fn check_job(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> AppResult<Json<JobView>> {
    let view = state.orchestrator.poll(&JobId::from(job_id)).await?;
    Ok(Json(view))
}

/// GET /api/jobs/{id}
pub async fn get_job(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> AppResult<Json<StagingJob>> {
    let job = state.orchestrator.get(&JobId::from(job_id)).await?;
    Ok(Json(job))
}

/// POST /api/jobs/{id}/cancel
pub async fn cancel_job(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> AppResult<Json<JobView>> {
    let job = state.orchestrator.cancel(&JobId::from(job_id)).await?;
    Ok(Json(job.view()))
}

#[derive(Debug, Deserialize)]
pub struct RecentQuery {
    pub limit: Option<usize>,
}

/// GET /api/recent-stagings?limit=N
pub async fn recent_stagings(
    State(state): State<AppState>,
    Query(query): Query<RecentQuery>,
) -> Json<RecentStagingsResponse> {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_RECENT_LIMIT)
        .clamp(1, MAX_RECENT_LIMIT);

    let stagings = state
        .orchestrator
        .recent(limit)
        .await
        .into_iter()
        .map(|job| RecentStaging {
            job_id: job.id,
            space_type_label: catalogue::space_type_label(&job.params.space_type),
            design_theme_label: job
                .params
                .design_theme
                .as_deref()
                .and_then(catalogue::design_theme_label),
            space_type: job.params.space_type,
            design_theme: job.params.design_theme,
            image_url: job.image_url,
            output_urls: job.output_urls,
            completed_at: job.completed_at,
        })
        .collect();

    Json(RecentStagingsResponse { stagings })
}

/// GET /api/catalogue
pub async fn catalogue() -> Json<CatalogueResponse> {
    Json(CatalogueResponse {
        space_types: SPACE_TYPES,
        design_themes: DESIGN_THEMES,
    })
}
