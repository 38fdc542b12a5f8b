//! Job registry.
//!
//! [`InMemoryJobStore`] holds one `Mutex` per job behind a map-level
//! `RwLock`. The map lock is only held long enough to find the entry, so a
//! callback and a client poll for the same job serialize on that job's
//! mutex while unrelated jobs proceed.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use stager_core::error::CoreError;
use stager_core::staging::{JobStatus, StagingJob};
use stager_core::types::{JobId, Timestamp};
use tokio::sync::{Mutex, RwLock};

/// A mutation applied to a job under its lock. Returning an error leaves the
/// error to the caller; mutations must not partially apply before failing.
pub type JobMutation = Box<dyn FnOnce(&mut StagingJob) -> Result<(), CoreError> + Send>;

#[async_trait]
pub trait JobStore: Send + Sync {
    /// Add a new job. Fails with `Conflict` if the id is taken.
    async fn insert(&self, job: StagingJob) -> Result<(), CoreError>;

    /// Snapshot of a job.
    async fn get(&self, id: &JobId) -> Option<StagingJob>;

    /// Apply `mutation` under the job's lock and return the updated snapshot.
    async fn update(&self, id: &JobId, mutation: JobMutation) -> Result<StagingJob, CoreError>;

    /// Completed jobs, most recently completed first.
    async fn list_completed(&self, limit: usize) -> Vec<StagingJob>;

    /// Ids of jobs that have not settled and were created before `cutoff`.
    async fn list_unsettled_before(&self, cutoff: Timestamp) -> Vec<JobId>;

    /// Remove terminal jobs last updated before `cutoff`. Returns the removed
    /// ids.
    async fn purge_older_than(&self, cutoff: Timestamp) -> Vec<JobId>;
}

#[derive(Default)]
pub struct InMemoryJobStore {
    jobs: RwLock<HashMap<JobId, Arc<Mutex<StagingJob>>>>,
}

impl InMemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }

    async fn entry(&self, id: &JobId) -> Option<Arc<Mutex<StagingJob>>> {
        self.jobs.read().await.get(id).cloned()
    }

    async fn snapshot(&self) -> Vec<StagingJob> {
        let entries: Vec<_> = self.jobs.read().await.values().cloned().collect();
        let mut jobs = Vec::with_capacity(entries.len());
        for entry in entries {
            jobs.push(entry.lock().await.clone());
        }
        jobs
    }
}

#[async_trait]
impl JobStore for InMemoryJobStore {
    async fn insert(&self, job: StagingJob) -> Result<(), CoreError> {
        let mut jobs = self.jobs.write().await;
        if jobs.contains_key(&job.id) {
            return Err(CoreError::Conflict(format!("job {} already exists", job.id)));
        }
        jobs.insert(job.id.clone(), Arc::new(Mutex::new(job)));
        Ok(())
    }

    async fn get(&self, id: &JobId) -> Option<StagingJob> {
        let entry = self.entry(id).await?;
        let job = entry.lock().await.clone();
        Some(job)
    }

    async fn update(&self, id: &JobId, mutation: JobMutation) -> Result<StagingJob, CoreError> {
        let entry = self
            .entry(id)
            .await
            .ok_or_else(|| CoreError::NotFound(id.clone()))?;
        let mut job = entry.lock().await;
        mutation(&mut *job)?;
        Ok(job.clone())
    }

    async fn list_completed(&self, limit: usize) -> Vec<StagingJob> {
        let mut completed: Vec<StagingJob> = self
            .snapshot()
            .await
            .into_iter()
            .filter(|j| j.status == JobStatus::Completed)
            .collect();
        completed.sort_by(|a, b| b.completed_at.cmp(&a.completed_at));
        completed.truncate(limit);
        completed
    }

    async fn list_unsettled_before(&self, cutoff: Timestamp) -> Vec<JobId> {
        self.snapshot()
            .await
            .into_iter()
            .filter(|j| !j.status.is_terminal() && j.created_at < cutoff)
            .map(|j| j.id)
            .collect()
    }

    async fn purge_older_than(&self, cutoff: Timestamp) -> Vec<JobId> {
        let expired: Vec<JobId> = self
            .snapshot()
            .await
            .into_iter()
            .filter(|j| j.status.is_terminal() && j.updated_at < cutoff)
            .map(|j| j.id)
            .collect();

        let mut jobs = self.jobs.write().await;
        for id in &expired {
            jobs.remove(id);
        }
        expired
    }
}
