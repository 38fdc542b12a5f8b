//! Response bodies shared by handlers.
//!
//! The browser client predates the `{ error, code }` error envelope and
//! reads a `success` flag on the upload and stage responses, so those keep
//! their flat shape.

use serde::Serialize;
use stager_core::catalogue::CatalogueEntry;
use stager_core::staging::JobStatus;
use stager_core::types::JobId;

/// `POST /api/upload-image`
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub success: bool,
    pub image_url: String,
    /// Host that accepted the image.
    pub host: Option<&'static str>,
}

/// `POST /api/stage`
#[derive(Debug, Serialize)]
pub struct StageResponse {
    pub success: bool,
    pub job_id: JobId,
    pub status: JobStatus,
    /// Public URL the provider will fetch the photo from.
    pub image_url: String,
}

/// One entry of `GET /api/recent-stagings`.
#[derive(Debug, Serialize)]
pub struct RecentStaging {
    pub job_id: JobId,
    pub space_type: String,
    pub design_theme: Option<String>,
    /// Display names for catalogue codes; absent for codes outside the list.
    pub space_type_label: Option<&'static str>,
    pub design_theme_label: Option<&'static str>,
    pub image_url: String,
    pub output_urls: Vec<String>,
    pub completed_at: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Debug, Serialize)]
pub struct RecentStagingsResponse {
    pub stagings: Vec<RecentStaging>,
}

/// `GET /api/catalogue`
#[derive(Debug, Serialize)]
pub struct CatalogueResponse {
    pub space_types: &'static [CatalogueEntry],
    pub design_themes: &'static [CatalogueEntry],
}

/// Webhook acknowledgement. `received` is false when the job id is unknown.
#[derive(Debug, Serialize)]
pub struct WebhookAck {
    pub status: &'static str,
    pub received: bool,
}
