//! In-process job table for the local regime.

use dashmap::DashMap;

use landmark_core::{AnalysisRequest, JobRecord};

/// Process-wide registry of local jobs.
///
/// Created once at startup and shared by handle; the dispatcher and the
/// status store receive the same instance by construction rather than
/// through a global. Each job's entry is written by exactly one task (the
/// one executing it), so the map's own synchronization is all that is
/// needed.
///
/// Terminal states are final: a transition attempted on a finished or failed
/// record is ignored and logged, never applied.
#[derive(Debug, Default)]
pub struct JobRegistry {
    jobs: DashMap<String, JobRecord>,
}

impl JobRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a freshly enqueued job.
    pub fn insert_queued(&self, job_id: String, request: AnalysisRequest) {
        let record = JobRecord::queued(job_id.clone(), request);
        self.jobs.insert(job_id, record);
    }

    /// Move a job to `Started`.
    pub fn mark_started(&self, job_id: &str) -> bool {
        self.transition(job_id, "started", |record| record.mark_started())
    }

    /// Move a job to `Finished` with its result payload.
    pub fn mark_finished(&self, job_id: &str, result: serde_json::Value) -> bool {
        self.transition(job_id, "finished", |record| record.mark_finished(result))
    }

    /// Move a job to `Failed` with an error description.
    pub fn mark_failed(&self, job_id: &str, error: String) -> bool {
        self.transition(job_id, "failed", |record| record.mark_failed(error))
    }

    /// Snapshot of a job's record, if known.
    pub fn get(&self, job_id: &str) -> Option<JobRecord> {
        self.jobs.get(job_id).map(|entry| entry.value().clone())
    }

    /// Number of jobs currently tracked.
    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    /// Whether the registry tracks no jobs.
    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Drop every record. Intended for process shutdown and tests.
    pub fn clear(&self) {
        self.jobs.clear();
    }

    fn transition<F>(&self, job_id: &str, to: &str, apply: F) -> bool
    where
        F: FnOnce(&mut JobRecord) -> bool,
    {
        match self.jobs.get_mut(job_id) {
            Some(mut entry) => {
                let applied = apply(entry.value_mut());
                if !applied {
                    tracing::warn!(
                        job_id,
                        to,
                        status = %entry.value().status,
                        "Ignoring transition on terminal job"
                    );
                }
                applied
            }
            None => {
                tracing::warn!(job_id, to, "Transition requested for unknown job");
                false
            }
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use landmark_core::JobStatus;
    use serde_json::json;

    fn request() -> AnalysisRequest {
        AnalysisRequest::new("1 Wall St, New York, NY", 500, false)
    }

    #[test]
    fn test_insert_and_get() {
        let registry = JobRegistry::new();
        registry.insert_queued("job-1".to_string(), request());

        let record = registry.get("job-1").expect("record present");
        assert_eq!(record.status, JobStatus::Queued);
        assert_eq!(record.request.radius_m, 500);
        assert!(registry.get("job-2").is_none());
    }

    #[test]
    fn test_full_transition_chain() {
        let registry = JobRegistry::new();
        registry.insert_queued("job-1".to_string(), request());

        assert!(registry.mark_started("job-1"));
        assert_eq!(
            registry.get("job-1").map(|r| r.status),
            Some(JobStatus::Started)
        );

        assert!(registry.mark_finished("job-1", json!({"verdict": "Hold"})));
        let record = registry.get("job-1").expect("record");
        assert_eq!(record.status, JobStatus::Finished);
        assert_eq!(record.result, Some(json!({"verdict": "Hold"})));
    }

    #[test]
    fn test_terminal_transitions_are_ignored() {
        let registry = JobRegistry::new();
        registry.insert_queued("job-1".to_string(), request());
        registry.mark_started("job-1");
        registry.mark_failed("job-1", "boom".to_string());

        assert!(!registry.mark_finished("job-1", json!({})));
        assert!(!registry.mark_started("job-1"));

        let record = registry.get("job-1").expect("record");
        assert_eq!(record.status, JobStatus::Failed);
        assert_eq!(record.error.as_deref(), Some("boom"));
        assert!(record.result.is_none());
    }

    #[test]
    fn test_transition_on_unknown_job_is_noop() {
        let registry = JobRegistry::new();
        assert!(!registry.mark_started("ghost"));
        assert!(!registry.mark_failed("ghost", "whatever".to_string()));
    }

    #[test]
    fn test_clear() {
        let registry = JobRegistry::new();
        registry.insert_queued("a".to_string(), request());
        registry.insert_queued("b".to_string(), request());
        assert_eq!(registry.len(), 2);

        registry.clear();
        assert!(registry.is_empty());
    }
}
