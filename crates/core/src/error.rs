use serde::{Deserialize, Serialize};

use crate::types::JobId;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CoreError {
    #[error("Staging job not found: {0}")]
    NotFound(JobId),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Timed out: {0}")]
    Timeout(String),

    #[error("Processing failed: {0}")]
    Processing(String),

    #[error("Cancelled: {0}")]
    Cancelled(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Category of a job failure, recorded on the job and reported to the
/// browser client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Validation,
    Upstream,
    Timeout,
    Processing,
    Cancelled,
    Internal,
}

impl CoreError {
    /// The failure category this error is recorded under when it ends a job.
    pub fn kind(&self) -> FailureKind {
        match self {
            CoreError::Validation(_) => FailureKind::Validation,
            CoreError::Upstream(_) => FailureKind::Upstream,
            CoreError::Timeout(_) => FailureKind::Timeout,
            CoreError::Processing(_) => FailureKind::Processing,
            CoreError::Cancelled(_) => FailureKind::Cancelled,
            CoreError::NotFound(_) | CoreError::Conflict(_) | CoreError::Internal(_) => {
                FailureKind::Internal
            }
        }
    }

    /// The message without the variant prefix.
    pub fn detail(&self) -> String {
        match self {
            CoreError::NotFound(id) => format!("job {id} not found"),
            CoreError::Validation(msg)
            | CoreError::Upstream(msg)
            | CoreError::Timeout(msg)
            | CoreError::Processing(msg)
            | CoreError::Cancelled(msg)
            | CoreError::Conflict(msg)
            | CoreError::Internal(msg) => msg.clone(),
        }
    }
}
