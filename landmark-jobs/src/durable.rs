//! Redis-backed durable queue.
//!
//! Jobs live in two structures: a pending list (`landmark:jobs:pending`)
//! that workers block-pop from, and one hash per job
//! (`landmark:job:{id}`) holding the status, the captured request, the
//! lifecycle timestamps, and the terminal result or error.
//!
//! Ordering across jobs is whatever the list gives; each job is executed
//! at most once per dequeue, with no extra idempotency layer on top of the
//! broker's delivery semantics. There is no cancellation: once popped, a job
//! runs to completion or to the worker's execution timeout.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use redis::aio::ConnectionManager;
use redis::AsyncCommands;

use landmark_core::{
    new_job_id, AnalysisRequest, JobError, JobRecord, JobStatus, LandmarkResult,
};

/// List the workers block-pop pending job ids from.
pub const PENDING_LIST: &str = "landmark:jobs:pending";

/// Hash key for one job's record.
pub fn job_hash_key(job_id: &str) -> String {
    format!("landmark:job:{}", job_id)
}

/// Client for the durable queue, shared by the dispatcher, the status
/// store, and the workers.
#[derive(Clone)]
pub struct RedisJobQueue {
    conn: ConnectionManager,
}

impl RedisJobQueue {
    /// Connect and verify reachability with a ping.
    ///
    /// # Errors
    /// `JobError::QueueUnavailable` when the URL does not parse, the
    /// connection cannot be established, or the ping fails.
    pub async fn connect(url: &str) -> LandmarkResult<Self> {
        let client = redis::Client::open(url).map_err(|e| JobError::QueueUnavailable {
            reason: format!("invalid redis url: {}", e),
        })?;

        let mut conn =
            client
                .get_connection_manager()
                .await
                .map_err(|e| JobError::QueueUnavailable {
                    reason: format!("connection failed: {}", e),
                })?;

        let _: String = redis::cmd("PING").query_async(&mut conn).await.map_err(|e| {
            JobError::QueueUnavailable {
                reason: format!("ping failed: {}", e),
            }
        })?;

        Ok(Self { conn })
    }

    /// Record a queued job and push its id onto the pending list.
    ///
    /// Returns the backend's job id (freshly generated here, but owned by
    /// the queue from this point on).
    pub async fn enqueue(&self, request: &AnalysisRequest) -> LandmarkResult<String> {
        let job_id = new_job_id();
        let request_json =
            serde_json::to_string(request).map_err(|e| JobError::QueueUnavailable {
                reason: format!("request serialization failed: {}", e),
            })?;

        let fields = vec![
            ("status", JobStatus::Queued.as_str().to_string()),
            ("request", request_json),
            ("created_at", Utc::now().to_rfc3339()),
        ];

        let mut conn = self.conn.clone();
        let key = job_hash_key(&job_id);
        let _: () = conn
            .hset_multiple(&key, &fields)
            .await
            .map_err(|e| JobError::QueueUnavailable {
                reason: format!("job record write failed: {}", e),
            })?;
        let _: () =
            conn.lpush(PENDING_LIST, &job_id)
                .await
                .map_err(|e| JobError::QueueUnavailable {
                    reason: format!("pending push failed: {}", e),
                })?;

        tracing::info!(job_id = %job_id, "Enqueued durable analysis job");
        Ok(job_id)
    }

    /// Look up a job's record.
    ///
    /// Any failure along the way (backend unreachable, missing hash,
    /// unparseable fields, unknown status vocabulary) is `None`; callers
    /// cannot distinguish a job that never existed from a backend that is
    /// down, and treat both as not-found.
    pub async fn get_status(&self, job_id: &str) -> Option<JobRecord> {
        let mut conn = self.conn.clone();
        let map: HashMap<String, String> = match conn.hgetall(job_hash_key(job_id)).await {
            Ok(map) => map,
            Err(e) => {
                tracing::debug!(job_id, error = %e, "Durable status lookup failed");
                return None;
            }
        };

        parse_record(job_id, &map)
    }

    /// Block-pop the next pending job id, waiting up to `timeout_secs`.
    ///
    /// `None` on timeout or transport error.
    pub async fn pop_pending(&self, timeout_secs: f64) -> Option<String> {
        let mut conn = self.conn.clone();
        let popped: Option<(String, String)> =
            match conn.brpop(PENDING_LIST, timeout_secs).await {
                Ok(popped) => popped,
                Err(e) => {
                    tracing::warn!(error = %e, "Pending pop failed");
                    return None;
                }
            };
        popped.map(|(_list, job_id)| job_id)
    }

    /// Mark a job started.
    pub async fn mark_started(&self, job_id: &str) -> LandmarkResult<()> {
        self.write_fields(
            job_id,
            vec![
                ("status", JobStatus::Started.as_str().to_string()),
                ("started_at", Utc::now().to_rfc3339()),
            ],
        )
        .await
    }

    /// Mark a job finished with its result payload.
    pub async fn mark_finished(
        &self,
        job_id: &str,
        result: &serde_json::Value,
    ) -> LandmarkResult<()> {
        self.write_fields(
            job_id,
            vec![
                ("status", JobStatus::Finished.as_str().to_string()),
                ("finished_at", Utc::now().to_rfc3339()),
                ("result", result.to_string()),
            ],
        )
        .await
    }

    /// Mark a job failed with an error description.
    pub async fn mark_failed(&self, job_id: &str, error: &str) -> LandmarkResult<()> {
        self.write_fields(
            job_id,
            vec![
                ("status", JobStatus::Failed.as_str().to_string()),
                ("failed_at", Utc::now().to_rfc3339()),
                ("error", error.to_string()),
            ],
        )
        .await
    }

    async fn write_fields(
        &self,
        job_id: &str,
        fields: Vec<(&str, String)>,
    ) -> LandmarkResult<()> {
        let mut conn = self.conn.clone();
        let _: () = conn
            .hset_multiple(job_hash_key(job_id), &fields)
            .await
            .map_err(|e| JobError::QueueUnavailable {
                reason: format!("job record update failed: {}", e),
            })?;
        Ok(())
    }
}

impl std::fmt::Debug for RedisJobQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisJobQueue").finish_non_exhaustive()
    }
}

/// Translate a stored hash into the four-state record model.
///
/// `None` when the hash is empty or any required field is missing or
/// malformed.
fn parse_record(job_id: &str, map: &HashMap<String, String>) -> Option<JobRecord> {
    if map.is_empty() {
        return None;
    }

    let status = JobStatus::from_str(map.get("status")?)?;
    let request: AnalysisRequest = serde_json::from_str(map.get("request")?).ok()?;
    let created_at = parse_timestamp(map.get("created_at")?)?;

    let result = map
        .get("result")
        .and_then(|raw| serde_json::from_str(raw).ok());
    let error = map.get("error").cloned();

    Some(JobRecord {
        job_id: job_id.to_string(),
        status,
        request,
        created_at,
        started_at: map.get("started_at").and_then(|s| parse_timestamp(s)),
        finished_at: map.get("finished_at").and_then(|s| parse_timestamp(s)),
        failed_at: map.get("failed_at").and_then(|s| parse_timestamp(s)),
        result,
        error,
    })
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn base_map() -> HashMap<String, String> {
        let request = AnalysisRequest::new("30 Rockefeller Plaza, New York, NY", 800, true);
        let mut map = HashMap::new();
        map.insert("status".to_string(), "queued".to_string());
        map.insert(
            "request".to_string(),
            serde_json::to_string(&request).expect("serialize"),
        );
        map.insert("created_at".to_string(), Utc::now().to_rfc3339());
        map
    }

    #[test]
    fn test_job_hash_key_format() {
        assert_eq!(job_hash_key("abc"), "landmark:job:abc");
    }

    #[test]
    fn test_parse_record_queued() {
        let record = parse_record("abc", &base_map()).expect("record");
        assert_eq!(record.job_id, "abc");
        assert_eq!(record.status, JobStatus::Queued);
        assert_eq!(record.request.radius_m, 800);
        assert!(record.started_at.is_none());
        assert!(record.result.is_none());
    }

    #[test]
    fn test_parse_record_finished_with_result() {
        let mut map = base_map();
        map.insert("status".to_string(), "finished".to_string());
        map.insert("started_at".to_string(), Utc::now().to_rfc3339());
        map.insert("finished_at".to_string(), Utc::now().to_rfc3339());
        map.insert("result".to_string(), r#"{"verdict":"Buy"}"#.to_string());

        let record = parse_record("abc", &map).expect("record");
        assert_eq!(record.status, JobStatus::Finished);
        assert_eq!(record.result, Some(serde_json::json!({"verdict": "Buy"})));
        assert!(record.error.is_none());
    }

    #[test]
    fn test_parse_record_failed_with_error() {
        let mut map = base_map();
        map.insert("status".to_string(), "failed".to_string());
        map.insert("failed_at".to_string(), Utc::now().to_rfc3339());
        map.insert("error".to_string(), "reasoner unreachable".to_string());

        let record = parse_record("abc", &map).expect("record");
        assert_eq!(record.status, JobStatus::Failed);
        assert_eq!(record.error.as_deref(), Some("reasoner unreachable"));
    }

    #[test]
    fn test_parse_record_empty_hash_is_none() {
        assert!(parse_record("abc", &HashMap::new()).is_none());
    }

    #[test]
    fn test_parse_record_unknown_vocabulary_is_none() {
        let mut map = base_map();
        map.insert("status".to_string(), "deferred".to_string());
        assert!(parse_record("abc", &map).is_none());
    }

    #[test]
    fn test_parse_record_malformed_request_is_none() {
        let mut map = base_map();
        map.insert("request".to_string(), "{oops".to_string());
        assert!(parse_record("abc", &map).is_none());
    }

    #[test]
    fn test_parse_record_malformed_created_at_is_none() {
        let mut map = base_map();
        map.insert("created_at".to_string(), "yesterday".to_string());
        assert!(parse_record("abc", &map).is_none());
    }
}
