//! Periodic cleanup of settled staging jobs and hosted images.
//!
//! Nothing is persisted, so without this the job registry and the image
//! cache grow for the life of the process. Runs on a fixed interval using
//! `tokio::time::interval`.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use stager_hosting::ImageCache;
use stager_pipeline::Orchestrator;
use tokio_util::sync::CancellationToken;

/// Upper bound on the time between sweeps.
const MAX_SWEEP_INTERVAL: Duration = Duration::from_secs(300);

/// Sweep often enough that nothing outlives `retention` by more than about
/// a tenth, bounded to [1s, 5min].
pub fn sweep_interval(retention: Duration) -> Duration {
    (retention / 10).clamp(Duration::from_secs(1), MAX_SWEEP_INTERVAL)
}

/// Run the retention loop until `cancel` is triggered.
///
/// Each sweep settles jobs still unfinished `retention` after creation as
/// `timeout`, removes settled jobs last updated more than `retention` ago and
/// drops cached images stored more than `retention` ago.
pub async fn run(
    orchestrator: Arc<Orchestrator>,
    image_cache: Arc<ImageCache>,
    retention: Duration,
    cancel: CancellationToken,
) {
    let every = sweep_interval(retention);
    tracing::info!(
        retention_secs = retention.as_secs(),
        interval_secs = every.as_secs(),
        "Retention job started"
    );

    let mut interval = tokio::time::interval(every);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Retention job stopping");
                break;
            }
            _ = interval.tick() => {
                let cutoff = match chrono::Duration::from_std(retention) {
                    Ok(age) => Utc::now() - age,
                    Err(e) => {
                        tracing::error!(error = %e, "Retention period out of range, stopping");
                        break;
                    }
                };

                let jobs = orchestrator.purge_older_than(cutoff).await;
                let images = image_cache.purge_older_than(cutoff).await;
                if jobs > 0 || images > 0 {
                    tracing::info!(jobs, images, "Retention: purged expired entries");
                } else {
                    tracing::debug!("Retention: nothing to purge");
                }
            }
        }
    }
}
