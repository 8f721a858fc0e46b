//! Durable-regime worker loop.
//!
//! One or more worker processes run this loop against the same Redis queue,
//! block-popping pending job ids and executing them through an [`Analyzer`].
//! Each execution is bounded by a wall-clock timeout; a job that exceeds it
//! is marked failed.
//!
//! # Usage
//!
//! ```ignore
//! use tokio::sync::watch;
//!
//! let (shutdown_tx, shutdown_rx) = watch::channel(false);
//! let metrics = run_worker(queue, analyzer, WorkerConfig::default(), shutdown_rx).await;
//!
//! // On shutdown
//! let _ = shutdown_tx.send(true);
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use landmark_core::Analyzer;

use crate::durable::RedisJobQueue;

/// Default wait on an empty pending list before re-checking shutdown.
pub const DEFAULT_POLL_TIMEOUT_SECS: u64 = 5;

/// Default upper bound on one job's execution wall-time (10 minutes).
pub const DEFAULT_JOB_TIMEOUT_SECS: u64 = 600;

/// Configuration for the worker loop.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// How long one blocking pop waits before the loop re-checks shutdown.
    pub poll_timeout: Duration,

    /// Maximum execution wall-time per job; exceeding it marks the job
    /// failed.
    pub job_timeout: Duration,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            poll_timeout: Duration::from_secs(DEFAULT_POLL_TIMEOUT_SECS),
            job_timeout: Duration::from_secs(DEFAULT_JOB_TIMEOUT_SECS),
        }
    }
}

/// Counters for worker activity.
#[derive(Debug, Default)]
pub struct WorkerMetrics {
    /// Jobs that reached a terminal state under this worker.
    pub jobs_processed: AtomicU64,

    /// Jobs that terminated as failed (including timeouts).
    pub jobs_failed: AtomicU64,

    /// Popped ids whose job record could not be loaded.
    pub records_missing: AtomicU64,
}

/// Run the worker loop until the shutdown signal flips.
///
/// Jobs are executed one at a time per worker; concurrency comes from
/// running more worker processes against the same queue.
pub async fn run_worker(
    queue: RedisJobQueue,
    analyzer: Arc<dyn Analyzer>,
    config: WorkerConfig,
    mut shutdown_rx: watch::Receiver<bool>,
) -> Arc<WorkerMetrics> {
    let metrics = Arc::new(WorkerMetrics::default());

    tracing::info!(
        poll_timeout_secs = config.poll_timeout.as_secs(),
        job_timeout_secs = config.job_timeout.as_secs(),
        "Analysis worker started"
    );

    loop {
        tokio::select! {
            _ = shutdown_rx.changed() => {
                if *shutdown_rx.borrow() {
                    tracing::info!("Analysis worker shutting down");
                    break;
                }
            }

            popped = queue.pop_pending(config.poll_timeout.as_secs_f64()) => {
                if let Some(job_id) = popped {
                    process_job(&queue, &analyzer, &config, &metrics, &job_id).await;
                }
            }
        }
    }

    tracing::info!(
        jobs_processed = metrics.jobs_processed.load(Ordering::Relaxed),
        jobs_failed = metrics.jobs_failed.load(Ordering::Relaxed),
        "Analysis worker stopped"
    );

    metrics
}

/// Execute one popped job and write its terminal state back to the queue.
async fn process_job(
    queue: &RedisJobQueue,
    analyzer: &Arc<dyn Analyzer>,
    config: &WorkerConfig,
    metrics: &WorkerMetrics,
    job_id: &str,
) {
    let record = match queue.get_status(job_id).await {
        Some(record) => record,
        None => {
            tracing::warn!(job_id, "Popped job id has no readable record; skipping");
            metrics.records_missing.fetch_add(1, Ordering::Relaxed);
            return;
        }
    };

    if let Err(e) = queue.mark_started(job_id).await {
        tracing::error!(job_id, error = %e, "Failed to mark job started");
        return;
    }
    tracing::info!(job_id, address = %record.request.address, "Started analysis job");

    let outcome = tokio::time::timeout(config.job_timeout, analyzer.run(&record.request)).await;

    let write = match outcome {
        Ok(Ok(memo)) => match serde_json::to_value(&memo) {
            Ok(result) => queue.mark_finished(job_id, &result).await,
            Err(e) => {
                metrics.jobs_failed.fetch_add(1, Ordering::Relaxed);
                queue
                    .mark_failed(job_id, &format!("result serialization failed: {}", e))
                    .await
            }
        },
        Ok(Err(e)) => {
            tracing::warn!(job_id, error = %e, "Analysis job failed");
            metrics.jobs_failed.fetch_add(1, Ordering::Relaxed);
            queue.mark_failed(job_id, &e.to_string()).await
        }
        Err(_elapsed) => {
            tracing::warn!(
                job_id,
                timeout_secs = config.job_timeout.as_secs(),
                "Analysis job exceeded execution timeout"
            );
            metrics.jobs_failed.fetch_add(1, Ordering::Relaxed);
            queue
                .mark_failed(
                    job_id,
                    &format!(
                        "job exceeded execution timeout of {}s",
                        config.job_timeout.as_secs()
                    ),
                )
                .await
        }
    };

    if let Err(e) = write {
        tracing::error!(job_id, error = %e, "Failed to record job outcome");
        return;
    }

    metrics.jobs_processed.fetch_add(1, Ordering::Relaxed);
}

// =============================================================================
// TESTS
// =============================================================================
