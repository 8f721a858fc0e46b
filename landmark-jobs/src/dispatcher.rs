//! Job dispatch.

use std::sync::Arc;

use landmark_core::{new_job_id, AnalysisRequest, Analyzer, LandmarkResult};

use crate::backend::ExecutionBackend;
use crate::registry::JobRegistry;

/// Accepts analysis requests and hands them to the resolved backend.
///
/// `enqueue` returns the job id immediately in both regimes; it never waits
/// for the work itself. In the local regime the execution task is spawned
/// fire-and-forget: the dispatcher does not join it, so a process exit with
/// jobs in flight loses them (best-effort by design). There is no
/// backpressure in the local regime either; every accepted request spawns a
/// task at once.
pub struct JobDispatcher {
    backend: Arc<ExecutionBackend>,
    analyzer: Arc<dyn Analyzer>,
}

impl JobDispatcher {
    pub fn new(backend: Arc<ExecutionBackend>, analyzer: Arc<dyn Analyzer>) -> Self {
        Self { backend, analyzer }
    }

    /// Enqueue an analysis job and return its id.
    ///
    /// # Errors
    /// `JobError::QueueUnavailable` when the durable backend cannot accept
    /// the job. Local dispatch does not fail. Failures *inside* the job are
    /// never surfaced here; they are recorded on the job and retrieved by
    /// polling.
    pub async fn enqueue(&self, request: AnalysisRequest) -> LandmarkResult<String> {
        match self.backend.as_ref() {
            ExecutionBackend::Durable(queue) => queue.enqueue(&request).await,
            ExecutionBackend::Local(registry) => {
                let job_id = new_job_id();
                registry.insert_queued(job_id.clone(), request.clone());
                tracing::info!(job_id = %job_id, address = %request.address, "Enqueued local analysis job");

                let registry = Arc::clone(registry);
                let analyzer = Arc::clone(&self.analyzer);
                let spawned_id = job_id.clone();
                tokio::spawn(async move {
                    run_local_job(registry, analyzer, spawned_id, request).await;
                });

                Ok(job_id)
            }
        }
    }
}

/// Execute one local job and record its terminal state.
///
/// Every analyzer failure is converted into job state here; nothing
/// propagates out of the spawned task.
async fn run_local_job(
    registry: Arc<JobRegistry>,
    analyzer: Arc<dyn Analyzer>,
    job_id: String,
    request: AnalysisRequest,
) {
    registry.mark_started(&job_id);

    match analyzer.run(&request).await {
        Ok(memo) => match serde_json::to_value(&memo) {
            Ok(result) => {
                registry.mark_finished(&job_id, result);
                tracing::info!(job_id = %job_id, "Local analysis job finished");
            }
            Err(e) => {
                registry.mark_failed(&job_id, format!("result serialization failed: {}", e));
                tracing::error!(job_id = %job_id, error = %e, "Local analysis job produced unserializable result");
            }
        },
        Err(e) => {
            tracing::warn!(job_id = %job_id, error = %e, "Local analysis job failed");
            registry.mark_failed(&job_id, e.to_string());
        }
    }
}

impl std::fmt::Debug for JobDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobDispatcher")
            .field("backend", &self.backend)
            .finish_non_exhaustive()
    }
}
