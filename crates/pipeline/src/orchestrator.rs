//! Staging job orchestrator.
//!
//! [`Orchestrator`] owns the job workflow. [`Orchestrator::submit`] records a
//! job and returns immediately; a background task then
//!
//! 1. submits the segmentation request,
//! 2. polls segmentation until it settles (see [`poll_masks`]),
//! 3. selects masks through the configured [`MaskSelectionPolicy`],
//! 4. submits the generation request with a per-job callback URL.
//!
//! The job completes when the provider calls back
//! ([`Orchestrator::receive_callback`]). Clients observe progress with
//! [`Orchestrator::poll`] or wait on the event bus with
//! [`Orchestrator::wait_for_terminal`]. Every status change is published as a
//! [`StagingEvent`].

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use stager_core::callback::{self, CallbackResult};
use stager_core::error::CoreError;
use stager_core::masks::{FurnishingFirst, MaskSelectionPolicy};
use stager_core::staging::{JobView, StagingJob, StagingParams};
use stager_core::types::{JobId, Timestamp};
use stager_events::{EventBus, StagingEvent};
use stager_reimagine::messages::{GenerationRequest, GENERATION_COUNT, GENERATION_MASK_CATEGORY};
use stager_reimagine::poller::{poll_masks, PollConfig, PollOutcome};
use stager_reimagine::provider::StagingProvider;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::store::JobStore;

/// Path prefix the provider calls back on; the job id is appended.
pub const CALLBACK_PATH: &str = "/webhook/reimaginehome";

/// How long [`Orchestrator::shutdown`] waits for each job task.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    pub poll: PollConfig,
    /// Externally reachable base URL of this backend, used to build callback
    /// addresses.
    pub public_base_url: String,
}

/// Result of ingesting a provider callback.
#[derive(Debug, Clone)]
pub enum CallbackOutcome {
    /// No such job; nothing was recorded.
    Ignored,
    /// The callback settled the job.
    Applied(StagingJob),
    /// The job had already settled; it is returned unchanged.
    AlreadyTerminal(StagingJob),
}

/// Bookkeeping for a job's background task.
struct RunningJob {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

pub struct Orchestrator {
    store: Arc<dyn JobStore>,
    provider: Arc<dyn StagingProvider>,
    policy: Arc<dyn MaskSelectionPolicy>,
    event_bus: Arc<EventBus>,
    config: OrchestratorConfig,
    running: Mutex<HashMap<JobId, RunningJob>>,
    /// Master cancellation token; every job task holds a child.
    cancel: CancellationToken,
}

impl Orchestrator {
    /// Create an orchestrator using the [`FurnishingFirst`] mask policy.
    pub fn new(
        store: Arc<dyn JobStore>,
        provider: Arc<dyn StagingProvider>,
        event_bus: Arc<EventBus>,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            store,
            provider,
            policy: Arc::new(FurnishingFirst),
            event_bus,
            config,
            running: Mutex::new(HashMap::new()),
            cancel: CancellationToken::new(),
        }
    }

    /// Replace the mask selection policy.
    pub fn with_policy(mut self, policy: Arc<dyn MaskSelectionPolicy>) -> Self {
        self.policy = policy;
        self
    }

    /// Record a new job and start its workflow in the background.
    ///
    /// Returns as soon as the job is stored, in `pending` status.
    pub async fn submit(
        self: &Arc<Self>,
        image_url: &str,
        params: StagingParams,
    ) -> Result<StagingJob, CoreError> {
        let image_url = image_url.trim();
        if image_url.is_empty() {
            return Err(CoreError::Validation("image is required".into()));
        }

        let job = StagingJob::new(JobId::generate(), image_url, params);
        self.store.insert(job.clone()).await?;
        self.event_bus.publish(StagingEvent::from_job(&job));

        tracing::info!(
            job_id = %job.id,
            space_type = %job.params.space_type,
            design_theme = job.params.design_theme.as_deref().unwrap_or("auto"),
            "Staging job submitted",
        );

        // Hold the registry lock across the spawn so the task cannot
        // deregister itself before it is registered.
        let mut running = self.running.lock().await;
        let cancel = self.cancel.child_token();
        let task_cancel = cancel.clone();
        let this = Arc::clone(self);
        let job_id = job.id.clone();
        let handle = tokio::spawn(async move {
            this.run_job(job_id, task_cancel).await;
        });
        running.insert(job.id.clone(), RunningJob { cancel, handle });

        Ok(job)
    }

    /// Ingest a provider callback for `job_id`.
    ///
    /// Unknown ids are acknowledged without touching state. A repeated
    /// callback leaves the settled job as it is.
    pub async fn receive_callback(
        &self,
        job_id: &JobId,
        payload: &serde_json::Value,
    ) -> Result<CallbackOutcome, CoreError> {
        if self.store.get(job_id).await.is_none() {
            tracing::warn!(job_id = %job_id, "Callback for unknown job ignored");
            return Ok(CallbackOutcome::Ignored);
        }

        let result = callback::interpret(payload);
        let applied = self
            .apply(job_id, move |job| match result {
                CallbackResult::Completed { output_urls } => job.complete(output_urls),
                CallbackResult::Failed { message } => job.fail(&CoreError::Processing(message)),
            })
            .await;

        match applied {
            Ok(job) => {
                self.stop_task(job_id).await;
                tracing::info!(
                    job_id = %job_id,
                    status = %job.status,
                    output_count = job.output_urls.len(),
                    "Callback settled staging job",
                );
                Ok(CallbackOutcome::Applied(job))
            }
            Err(CoreError::Conflict(_)) => {
                tracing::debug!(job_id = %job_id, "Callback for settled job, state unchanged");
                let job = self.get(job_id).await?;
                Ok(CallbackOutcome::AlreadyTerminal(job))
            }
            // Purged between the lookup and the update.
            Err(CoreError::NotFound(_)) => Ok(CallbackOutcome::Ignored),
            Err(e) => Err(e),
        }
    }

    pub async fn get(&self, job_id: &JobId) -> Result<StagingJob, CoreError> {
        self.store
            .get(job_id)
            .await
            .ok_or_else(|| CoreError::NotFound(job_id.clone()))
    }

    /// Client-facing view of a job.
    pub async fn poll(&self, job_id: &JobId) -> Result<JobView, CoreError> {
        Ok(self.get(job_id).await?.view())
    }

    /// Cancel a job that has not settled yet.
    ///
    /// The job is marked `cancelled` immediately; its background task stops
    /// at its next await point.
    pub async fn cancel(&self, job_id: &JobId) -> Result<StagingJob, CoreError> {
        let job = self
            .apply(job_id, |job| {
                job.fail(&CoreError::Cancelled("cancelled by client".into()))
            })
            .await
            .map_err(|e| match e {
                CoreError::Conflict(_) => {
                    CoreError::Conflict(format!("job {job_id} has already finished"))
                }
                other => other,
            })?;
        self.stop_task(job_id).await;
        tracing::info!(job_id = %job_id, "Staging job cancelled");
        Ok(job)
    }

    /// Wait until `job_id` settles, or fail with `Timeout` after `timeout`.
    pub async fn wait_for_terminal(
        &self,
        job_id: &JobId,
        timeout: Duration,
    ) -> Result<StagingJob, CoreError> {
        // Subscribe before reading so a transition in between is not missed.
        let mut rx = self.event_bus.subscribe();
        let job = self.get(job_id).await?;
        if job.status.is_terminal() {
            return Ok(job);
        }

        let wait = async {
            loop {
                match rx.recv().await {
                    Ok(event) if &event.job_id == job_id && event.is_terminal() => break,
                    Ok(_) => {}
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::debug!(skipped, "Event receiver lagged, re-reading job");
                        match self.store.get(job_id).await {
                            Some(job) if !job.status.is_terminal() => {}
                            _ => break,
                        }
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        };

        tokio::time::timeout(timeout, wait).await.map_err(|_| {
            CoreError::Timeout(format!(
                "job {job_id} did not finish within {}s",
                timeout.as_secs()
            ))
        })?;
        self.get(job_id).await
    }

    /// Most recently completed jobs, newest first.
    pub async fn recent(&self, limit: usize) -> Vec<StagingJob> {
        self.store.list_completed(limit).await
    }

    /// Settle jobs created before `cutoff` that are still waiting, as
    /// `timeout`. A lost callback would otherwise leave them `generating`
    /// for the life of the process.
    pub async fn expire_stale(&self, cutoff: Timestamp) -> usize {
        let mut expired = 0;
        for job_id in self.store.list_unsettled_before(cutoff).await {
            let result = self
                .apply(&job_id, |job| {
                    job.fail(&CoreError::Timeout(
                        "no result received before the retention deadline".into(),
                    ))
                })
                .await;
            match result {
                Ok(_) => {
                    self.stop_task(&job_id).await;
                    tracing::warn!(job_id = %job_id, "Expired unsettled staging job");
                    expired += 1;
                }
                // Settled or purged since the listing.
                Err(CoreError::Conflict(_) | CoreError::NotFound(_)) => {}
                Err(e) => {
                    tracing::error!(job_id = %job_id, error = %e, "Failed to expire staging job");
                }
            }
        }
        expired
    }

    /// Expire unsettled jobs created before `cutoff`, then drop settled jobs
    /// last updated before it.
    pub async fn purge_older_than(&self, cutoff: Timestamp) -> usize {
        self.expire_stale(cutoff).await;
        let removed = self.store.purge_older_than(cutoff).await;
        if !removed.is_empty() {
            tracing::info!(count = removed.len(), "Purged expired staging jobs");
        }
        removed.len()
    }

    /// Number of jobs with a live background task.
    pub async fn active_jobs(&self) -> usize {
        self.running.lock().await.len()
    }

    /// Callback address handed to the provider for `job_id`.
    pub fn callback_url(&self, job_id: &JobId) -> String {
        format!(
            "{}{}/{}",
            self.config.public_base_url.trim_end_matches('/'),
            CALLBACK_PATH,
            job_id
        )
    }

    /// Cancel every job task and wait briefly for each to exit.
    pub async fn shutdown(&self) {
        tracing::info!("Shutting down staging orchestrator");
        self.cancel.cancel();

        let drained: Vec<(JobId, RunningJob)> = self.running.lock().await.drain().collect();
        for (job_id, job) in drained {
            tracing::info!(job_id = %job_id, "Stopping staging job task");
            job.cancel.cancel();
            let _ = tokio::time::timeout(SHUTDOWN_GRACE, job.handle).await;
        }

        tracing::info!("Staging orchestrator shut down");
    }

    // ---- private helpers ----

    /// Body of a job's background task.
    async fn run_job(self: Arc<Self>, job_id: JobId, cancel: CancellationToken) {
        let result = match self.store.get(&job_id).await {
            Some(job) => self.drive(job, &cancel).await,
            None => Err(CoreError::NotFound(job_id.clone())),
        };

        if let Err(err) = result {
            tracing::warn!(job_id = %job_id, error = %err, "Staging workflow stopped");
            match self.apply(&job_id, move |job| job.fail(&err)).await {
                Ok(_) | Err(CoreError::NotFound(_)) => {}
                Err(CoreError::Conflict(_)) => {
                    tracing::debug!(job_id = %job_id, "Job already settled");
                }
                Err(e) => {
                    tracing::error!(job_id = %job_id, error = %e, "Failed to record job failure");
                }
            }
        }

        self.running.lock().await.remove(&job_id);
    }

    /// Segmentation, mask selection and generation submission.
    async fn drive(&self, job: StagingJob, cancel: &CancellationToken) -> Result<(), CoreError> {
        let job_id = job.id.clone();

        let mask_job_id = until_cancelled(cancel, self.provider.create_segmentation(&job.image_url))
            .await?
            .map_err(|e| CoreError::Upstream(format!("segmentation request rejected: {e}")))?;
        tracing::info!(
            job_id = %job_id,
            provider = self.provider.name(),
            mask_job_id = %mask_job_id,
            "Segmentation submitted",
        );

        let handle = mask_job_id.clone();
        self.apply(&job_id, move |job| job.start_masking(handle)).await?;

        let masks = match poll_masks(
            self.provider.as_ref(),
            &mask_job_id,
            &self.config.poll,
            cancel,
        )
        .await
        {
            PollOutcome::Ready(masks) => masks,
            PollOutcome::Failed(message) => return Err(CoreError::Processing(message)),
            PollOutcome::Exhausted { attempts } => {
                return Err(CoreError::Timeout(format!(
                    "segmentation did not finish after {attempts} attempts"
                )))
            }
            PollOutcome::Cancelled => {
                return Err(CoreError::Cancelled("cancelled during segmentation".into()))
            }
        };

        let mask_urls = self.policy.select(&masks);
        if mask_urls.is_empty() {
            return Err(CoreError::Processing(
                "segmentation returned no usable masks".into(),
            ));
        }
        tracing::debug!(job_id = %job_id, ?mask_urls, "Masks selected");

        let request = GenerationRequest {
            image_url: job.image_url.clone(),
            mask_urls: mask_urls.clone(),
            mask_category: GENERATION_MASK_CATEGORY.to_string(),
            space_type: job.params.space_type.clone(),
            design_theme: job.params.design_theme.clone(),
            generation_count: GENERATION_COUNT,
            webhook_url: self.callback_url(&job_id),
        };

        let generation_job_id =
            until_cancelled(cancel, self.provider.create_generation(&request))
                .await?
                .map_err(|e| CoreError::Upstream(format!("generation request rejected: {e}")))?;
        tracing::info!(
            job_id = %job_id,
            generation_job_id = %generation_job_id,
            mask_count = mask_urls.len(),
            "Generation submitted, awaiting callback",
        );

        self.apply(&job_id, move |job| {
            job.start_generating(mask_urls, generation_job_id)
        })
        .await?;
        Ok(())
    }

    /// Mutate a job through the store and publish the new state.
    async fn apply<F>(&self, job_id: &JobId, mutation: F) -> Result<StagingJob, CoreError>
    where
        F: FnOnce(&mut StagingJob) -> Result<(), CoreError> + Send + 'static,
    {
        let job = self.store.update(job_id, Box::new(mutation)).await?;
        self.event_bus.publish(StagingEvent::from_job(&job));
        Ok(job)
    }

    /// Signal a job's background task to stop. The task deregisters itself.
    async fn stop_task(&self, job_id: &JobId) {
        if let Some(running) = self.running.lock().await.get(job_id) {
            running.cancel.cancel();
        }
    }
}

/// Run `fut` unless `cancel` fires first.
async fn until_cancelled<T>(
    cancel: &CancellationToken,
    fut: impl Future<Output = T>,
) -> Result<T, CoreError> {
    tokio::select! {
        _ = cancel.cancelled() => Err(CoreError::Cancelled("job cancelled".into())),
        out = fut => Ok(out),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
