//! Job lifecycle model.
//!
//! A job moves `Queued -> Started -> Finished | Failed`. The terminal states
//! are exclusive and final: a record carries either a result or an error,
//! never both, and no transition ever leaves a terminal state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::analysis::AnalysisRequest;

/// Generate a fresh opaque job identifier (UUIDv7, timestamp-sortable).
pub fn new_job_id() -> String {
    Uuid::now_v7().to_string()
}

/// Lifecycle state of an analysis job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Queued,
    Started,
    Finished,
    Failed,
}

impl JobStatus {
    /// Stable string form, used for durable backend storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Queued => "queued",
            JobStatus::Started => "started",
            JobStatus::Finished => "finished",
            JobStatus::Failed => "failed",
        }
    }

    /// Translate a stored status back into the four-state model.
    ///
    /// Returns `None` for vocabulary this model does not recognize; callers
    /// treat that the same as a failed lookup.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "queued" => Some(JobStatus::Queued),
            "started" => Some(JobStatus::Started),
            "finished" => Some(JobStatus::Finished),
            "failed" => Some(JobStatus::Failed),
            _ => None,
        }
    }

    /// Whether this status is terminal (no further transitions).
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Finished | JobStatus::Failed)
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single analysis job and everything known about it.
///
/// Mutated only through the `mark_*` methods, which refuse to move out of a
/// terminal state and set each timestamp at most once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRecord {
    pub job_id: String,
    pub status: JobStatus,
    pub request: AnalysisRequest,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    pub failed_at: Option<DateTime<Utc>>,
    pub result: Option<serde_json::Value>,
    pub error: Option<String>,
}

impl JobRecord {
    /// Create a freshly queued record for a request.
    pub fn queued(job_id: String, request: AnalysisRequest) -> Self {
        Self {
            job_id,
            status: JobStatus::Queued,
            request,
            created_at: Utc::now(),
            started_at: None,
            finished_at: None,
            failed_at: None,
            result: None,
            error: None,
        }
    }

    /// Move to `Started`. Returns false (and changes nothing) if the record
    /// is already terminal or already started.
    pub fn mark_started(&mut self) -> bool {
        if self.status != JobStatus::Queued {
            return false;
        }
        self.status = JobStatus::Started;
        self.started_at = Some(Utc::now());
        true
    }

    /// Move to `Finished` with a result. Returns false if already terminal.
    pub fn mark_finished(&mut self, result: serde_json::Value) -> bool {
        if self.status.is_terminal() {
            return false;
        }
        self.status = JobStatus::Finished;
        self.finished_at = Some(Utc::now());
        self.result = Some(result);
        true
    }

    /// Move to `Failed` with an error description. Returns false if already
    /// terminal.
    pub fn mark_failed(&mut self, error: impl Into<String>) -> bool {
        if self.status.is_terminal() {
            return false;
        }
        self.status = JobStatus::Failed;
        self.failed_at = Some(Utc::now());
        self.error = Some(error.into());
        true
    }
}

// =============================================================================
// TESTS
// =============================================================================
