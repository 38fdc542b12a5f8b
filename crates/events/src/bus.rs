//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] is shared via `Arc<EventBus>` between the orchestrator, which
//! publishes a [`StagingEvent`] on every job status change, and anything that
//! wants to wait for a job to settle instead of polling the store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use stager_core::staging::{JobFailure, JobStatus, StagingJob};
use stager_core::types::JobId;
use tokio::sync::broadcast;

// ---------------------------------------------------------------------------
// StagingEvent
// ---------------------------------------------------------------------------

/// A job status change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StagingEvent {
    pub job_id: JobId,
    pub status: JobStatus,
    /// Output images, populated once the job completes.
    pub output_urls: Vec<String>,
    pub error: Option<JobFailure>,
    pub timestamp: DateTime<Utc>,
}

impl StagingEvent {
    /// Snapshot the current state of `job`.
    pub fn from_job(job: &StagingJob) -> Self {
        Self {
            job_id: job.id.clone(),
            status: job.status,
            output_urls: job.output_urls.clone(),
            error: job.error.clone(),
            timestamp: Utc::now(),
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out event bus.
///
/// # Usage
///
/// ```rust
/// use stager_core::staging::{StagingJob, StagingParams};
/// use stager_events::bus::{EventBus, StagingEvent};
///
/// let bus = EventBus::default();
/// let mut rx = bus.subscribe();
///
/// let params = StagingParams::new(Some("ST-INT-011".into()), None).unwrap();
/// let job = StagingJob::new("job-1".into(), "https://img/room.jpg", params);
/// bus.publish(StagingEvent::from_job(&job));
/// ```
pub struct EventBus {
    sender: broadcast::Sender<StagingEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full, the oldest un-consumed messages are dropped
    /// and slow receivers will observe a `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// With no subscribers the event is dropped.
    pub fn publish(&self, event: StagingEvent) {
        tracing::debug!(job_id = %event.job_id, status = %event.status, "Staging event");
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StagingEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
