//! The staging provider seam.
//!
//! The orchestrator only talks to a `dyn StagingProvider`, so tests can run
//! the whole workflow against an in-memory fake and another vendor could be
//! slotted in behind the same three operations.

use async_trait::async_trait;

use crate::api::{ReimagineApi, ReimagineApiError};
use crate::messages::{GenerationRequest, MaskJobState};

#[async_trait]
pub trait StagingProvider: Send + Sync {
    /// Provider name used in logs.
    fn name(&self) -> &'static str;

    /// Start segmentation of `image_url`; returns the provider job id.
    async fn create_segmentation(&self, image_url: &str) -> Result<String, ReimagineApiError>;

    /// Current state of a segmentation job.
    async fn segmentation_status(&self, job_id: &str) -> Result<MaskJobState, ReimagineApiError>;

    /// Submit a generation request; returns the provider job id.
    async fn create_generation(
        &self,
        request: &GenerationRequest,
    ) -> Result<String, ReimagineApiError>;
}

#[async_trait]
impl StagingProvider for ReimagineApi {
    fn name(&self) -> &'static str {
        "reimaginehome"
    }

    async fn create_segmentation(&self, image_url: &str) -> Result<String, ReimagineApiError> {
        self.create_mask(image_url).await
    }

    async fn segmentation_status(&self, job_id: &str) -> Result<MaskJobState, ReimagineApiError> {
        self.mask_status(job_id).await
    }

    async fn create_generation(
        &self,
        request: &GenerationRequest,
    ) -> Result<String, ReimagineApiError> {
        self.generate_image(request).await
    }
}
