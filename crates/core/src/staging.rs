//! Staging job lifecycle.
//!
//! A job moves `pending -> masking -> generating` and then settles in one
//! terminal state (`completed`, `failed`, `timeout` or `cancelled`). Every
//! mutation goes through [`StagingJob::advance`], which rejects any
//! transition that would move the job backwards or out of a terminal state.

use serde::{Deserialize, Serialize};

use crate::catalogue;
use crate::error::{CoreError, FailureKind};
use crate::types::{JobId, Timestamp};

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Masking,
    Generating,
    Completed,
    Failed,
    Timeout,
    Cancelled,
}

impl JobStatus {
    /// Position in the lifecycle. All terminal states share the last rank.
    pub fn rank(self) -> u8 {
        match self {
            JobStatus::Pending => 0,
            JobStatus::Masking => 1,
            JobStatus::Generating => 2,
            JobStatus::Completed | JobStatus::Failed | JobStatus::Timeout | JobStatus::Cancelled => 3,
        }
    }

    pub fn is_terminal(self) -> bool {
        self.rank() == 3
    }

    /// Whether moving from `self` to `next` keeps the lifecycle monotonic.
    pub fn can_advance_to(self, next: JobStatus) -> bool {
        !self.is_terminal() && next.rank() > self.rank()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Masking => "masking",
            JobStatus::Generating => "generating",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
            JobStatus::Timeout => "timeout",
            JobStatus::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Parameters
// ---------------------------------------------------------------------------

/// Room and style choices forwarded to the provider's generation step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StagingParams {
    pub space_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub design_theme: Option<String>,
}

impl StagingParams {
    /// Validate and normalise raw parameters from a client request.
    ///
    /// A blank design theme means "let the provider decide" and is dropped.
    pub fn new(
        space_type: Option<String>,
        design_theme: Option<String>,
    ) -> Result<Self, CoreError> {
        let space_type = space_type
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| CoreError::Validation("space_type is required".into()))?;
        catalogue::validate_space_type(&space_type)?;

        let design_theme = design_theme
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        if let Some(theme) = &design_theme {
            catalogue::validate_design_theme(theme)?;
        }

        Ok(Self {
            space_type,
            design_theme,
        })
    }
}

// ---------------------------------------------------------------------------
// Failure record
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobFailure {
    pub kind: FailureKind,
    pub message: String,
}

impl From<&CoreError> for JobFailure {
    fn from(err: &CoreError) -> Self {
        Self {
            kind: err.kind(),
            message: err.detail(),
        }
    }
}

// ---------------------------------------------------------------------------
// Job
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StagingJob {
    pub id: JobId,
    pub status: JobStatus,
    pub image_url: String,
    pub params: StagingParams,
    /// Provider handle of the segmentation job, once submitted.
    pub mask_job_id: Option<String>,
    /// Mask URLs forwarded to the generation step.
    pub mask_urls: Vec<String>,
    /// Provider handle of the generation job, once submitted.
    pub generation_job_id: Option<String>,
    pub output_urls: Vec<String>,
    pub error: Option<JobFailure>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub completed_at: Option<Timestamp>,
}

impl StagingJob {
    pub fn new(id: JobId, image_url: impl Into<String>, params: StagingParams) -> Self {
        let now = chrono::Utc::now();
        Self {
            id,
            status: JobStatus::Pending,
            image_url: image_url.into(),
            params,
            mask_job_id: None,
            mask_urls: Vec::new(),
            generation_job_id: None,
            output_urls: Vec::new(),
            error: None,
            created_at: now,
            updated_at: now,
            completed_at: None,
        }
    }

    /// Move the job to `next`, refusing any non-monotonic transition.
    pub fn advance(&mut self, next: JobStatus) -> Result<(), CoreError> {
        if !self.status.can_advance_to(next) {
            return Err(CoreError::Conflict(format!(
                "job {} cannot move from {} to {}",
                self.id, self.status, next
            )));
        }
        let now = chrono::Utc::now();
        self.status = next;
        self.updated_at = now;
        if next.is_terminal() {
            self.completed_at = Some(now);
        }
        Ok(())
    }

    /// Record the provider segmentation handle and enter `masking`.
    pub fn start_masking(&mut self, mask_job_id: impl Into<String>) -> Result<(), CoreError> {
        self.advance(JobStatus::Masking)?;
        self.mask_job_id = Some(mask_job_id.into());
        Ok(())
    }

    /// Record the generation submission and enter `generating`.
    ///
    /// The provider handle is kept even if a callback already settled the
    /// job, so the record stays traceable; the status is then left alone.
    pub fn start_generating(
        &mut self,
        mask_urls: Vec<String>,
        generation_job_id: impl Into<String>,
    ) -> Result<(), CoreError> {
        self.mask_urls = mask_urls;
        self.generation_job_id = Some(generation_job_id.into());
        if self.status.is_terminal() {
            return Ok(());
        }
        self.advance(JobStatus::Generating)
    }

    /// Settle the job as completed with the given output images.
    pub fn complete(&mut self, output_urls: Vec<String>) -> Result<(), CoreError> {
        self.advance(JobStatus::Completed)?;
        self.output_urls = dedupe(output_urls);
        Ok(())
    }

    /// Settle the job in the terminal state matching `err`.
    pub fn fail(&mut self, err: &CoreError) -> Result<(), CoreError> {
        let next = match err.kind() {
            FailureKind::Timeout => JobStatus::Timeout,
            FailureKind::Cancelled => JobStatus::Cancelled,
            _ => JobStatus::Failed,
        };
        self.advance(next)?;
        self.error = Some(JobFailure::from(err));
        Ok(())
    }

    /// The client-facing projection of this job.
    pub fn view(&self) -> JobView {
        JobView {
            job_id: self.id.clone(),
            status: self.status,
            completed: self.status == JobStatus::Completed,
            output_urls: self.output_urls.clone(),
            error: self.error.clone(),
        }
    }
}

/// What a polling client sees for a job.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobView {
    pub job_id: JobId,
    pub status: JobStatus,
    pub completed: bool,
    pub output_urls: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JobFailure>,
}

/// Drop repeated URLs, keeping first-seen order.
pub fn dedupe(urls: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    urls.into_iter().filter(|u| seen.insert(u.clone())).collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
