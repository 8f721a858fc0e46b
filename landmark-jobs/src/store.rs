//! Job status lookup.

use std::sync::Arc;

use landmark_core::JobRecord;

use crate::backend::ExecutionBackend;

/// Looks up job state on whichever backend the process resolved at startup.
///
/// There is no cross-backend fallback: a durable store never consults the
/// local registry and vice versa. For the durable backend, every lookup
/// failure (including the backend being unreachable) reads as not-found.
#[derive(Debug)]
pub struct JobStore {
    backend: Arc<ExecutionBackend>,
}

impl JobStore {
    pub fn new(backend: Arc<ExecutionBackend>) -> Self {
        Self { backend }
    }

    /// Snapshot of a job's record, or `None` if unknown or unretrievable.
    pub async fn get_status(&self, job_id: &str) -> Option<JobRecord> {
        match self.backend.as_ref() {
            ExecutionBackend::Durable(queue) => queue.get_status(job_id).await,
            ExecutionBackend::Local(registry) => registry.get(job_id),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
