//! Fixed-interval polling of a segmentation job.
//!
//! [`poll_masks`] waits `interval` before every status query and gives up
//! after `max_attempts` queries. Both the wait and the in-flight query are
//! abandoned as soon as the [`CancellationToken`] fires.

use std::time::Duration;

use stager_core::masks::Mask;
use tokio_util::sync::CancellationToken;

use crate::messages::MaskJobState;
use crate::provider::StagingProvider;

/// Tunable parameters for segmentation polling.
#[derive(Debug, Clone)]
pub struct PollConfig {
    /// Delay before each status query.
    pub interval: Duration,
    /// Hard ceiling on status queries.
    pub max_attempts: u32,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(2),
            max_attempts: 20,
        }
    }
}

/// How a polling run ended.
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    Ready(Vec<Mask>),
    /// The provider reported an explicit failure.
    Failed(String),
    /// No terminal status within the attempt ceiling.
    Exhausted { attempts: u32 },
    Cancelled,
}

/// Poll `job_id` until it is done, failed, out of attempts or cancelled.
///
/// Transport errors and non-2xx responses count as a spent attempt and
/// polling continues.
pub async fn poll_masks(
    provider: &dyn StagingProvider,
    job_id: &str,
    config: &PollConfig,
    cancel: &CancellationToken,
) -> PollOutcome {
    for attempt in 1..=config.max_attempts {
        tokio::select! {
            _ = cancel.cancelled() => return PollOutcome::Cancelled,
            _ = tokio::time::sleep(config.interval) => {}
        }

        let result = tokio::select! {
            _ = cancel.cancelled() => return PollOutcome::Cancelled,
            result = provider.segmentation_status(job_id) => result,
        };

        match result {
            Ok(MaskJobState::Done(masks)) => {
                tracing::info!(
                    provider = provider.name(),
                    mask_job_id = job_id,
                    attempt,
                    mask_count = masks.len(),
                    "Segmentation finished",
                );
                return PollOutcome::Ready(masks);
            }
            Ok(MaskJobState::Failed(message)) => {
                tracing::warn!(
                    provider = provider.name(),
                    mask_job_id = job_id,
                    attempt,
                    error = %message,
                    "Segmentation failed",
                );
                return PollOutcome::Failed(message);
            }
            Ok(MaskJobState::InProgress(status)) => {
                tracing::debug!(
                    mask_job_id = job_id,
                    attempt,
                    status = status.as_deref().unwrap_or("unknown"),
                    "Segmentation still running",
                );
            }
            Err(e) => {
                tracing::warn!(
                    mask_job_id = job_id,
                    attempt,
                    error = %e,
                    "Segmentation status query failed",
                );
            }
        }
    }

    PollOutcome::Exhausted {
        attempts: config.max_attempts,
    }
}
