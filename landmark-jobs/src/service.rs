//! The analysis service.
//!
//! This is the surface the HTTP facade consumes: synchronous analysis,
//! cache-first asynchronous analysis, and result polling. The routing layer
//! itself lives elsewhere; everything behavioral about the three operations
//! is here.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use landmark_cache::{job_key, request_key, ResultCache};
use landmark_core::{
    AnalysisMemo, AnalysisRequest, Analyzer, JobError, JobRecord, JobStatus, LandmarkResult,
};

use crate::backend::ExecutionBackend;
use crate::dispatcher::JobDispatcher;
use crate::store::JobStore;

/// Pseudo job id returned when a request is served from the cache.
///
/// Deliberately not pollable: a cached result has no job record behind it,
/// and `result()` rejects this id with a client error.
pub const CACHED_JOB_ID: &str = "cached";

/// Default validity window for cached results (1 hour).
pub const DEFAULT_RESULT_TTL_SECS: u64 = 3600;

/// Response to an asynchronous analysis request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnqueueResponse {
    pub job_id: String,
    pub status: JobStatus,
    pub message: String,
    /// Present only when served from cache, so no polling is required.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
}

/// Response to a result poll.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobStatusResponse {
    pub job_id: String,
    pub status: JobStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl JobStatusResponse {
    fn from_record(record: JobRecord) -> Self {
        Self {
            job_id: record.job_id,
            status: record.status,
            created_at: Some(record.created_at),
            started_at: record.started_at,
            finished_at: record.finished_at,
            failed_at: record.failed_at,
            result: record.result,
            error: record.error,
        }
    }
}

/// Ties the dispatcher, the status store, and the result cache together.
pub struct AnalysisService {
    dispatcher: JobDispatcher,
    store: JobStore,
    cache: Arc<ResultCache>,
    analyzer: Arc<dyn Analyzer>,
    result_ttl_secs: u64,
}

impl AnalysisService {
    pub fn new(
        backend: Arc<ExecutionBackend>,
        analyzer: Arc<dyn Analyzer>,
        cache: Arc<ResultCache>,
    ) -> Self {
        Self {
            dispatcher: JobDispatcher::new(Arc::clone(&backend), Arc::clone(&analyzer)),
            store: JobStore::new(backend),
            cache,
            analyzer,
            result_ttl_secs: DEFAULT_RESULT_TTL_SECS,
        }
    }

    /// Override the TTL used when caching finished results.
    pub fn with_result_ttl(mut self, ttl_seconds: u64) -> Self {
        self.result_ttl_secs = ttl_seconds;
        self
    }

    /// The result cache this service consults.
    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }

    /// Run the full analysis inline and return the memo.
    ///
    /// The caller blocks for the whole pipeline; errors propagate directly.
    pub async fn analyze(&self, request: &AnalysisRequest) -> LandmarkResult<AnalysisMemo> {
        self.analyzer.run(request).await
    }

    /// Start an analysis asynchronously, consulting the cache first.
    ///
    /// A cache hit short-circuits dispatch entirely: the response carries the
    /// pseudo-id [`CACHED_JOB_ID`], a finished status, and the result inline.
    /// Otherwise the job is dispatched and the returned id is pollable via
    /// [`Self::result`].
    pub async fn analyze_async(
        &self,
        request: AnalysisRequest,
    ) -> LandmarkResult<EnqueueResponse> {
        let key = request_key(
            &request.address,
            request.radius_m,
            request.include_long_context,
        );

        if let Some(result) = self.cache.get(&key) {
            tracing::info!(key = %key, "Serving analysis from cache");
            return Ok(EnqueueResponse {
                job_id: CACHED_JOB_ID.to_string(),
                status: JobStatus::Finished,
                message: "Analysis result served from cache.".to_string(),
                result: Some(result),
            });
        }

        let job_id = self.dispatcher.enqueue(request).await?;
        Ok(EnqueueResponse {
            job_id,
            status: JobStatus::Queued,
            message: "Analysis job enqueued.".to_string(),
            result: None,
        })
    }

    /// Poll a job's status and, when terminal, its result or error.
    ///
    /// # Errors
    /// - `JobError::NotPollable` for the `"cached"` pseudo-id (an
    ///   intentional protocol asymmetry; cached results carry their payload
    ///   in the enqueue response instead).
    /// - `JobError::NotFound` for unknown or unretrievable ids.
    pub async fn result(&self, job_id: &str) -> LandmarkResult<JobStatusResponse> {
        if job_id == CACHED_JOB_ID {
            return Err(JobError::NotPollable {
                job_id: job_id.to_string(),
            }
            .into());
        }

        let record =
            self.store
                .get_status(job_id)
                .await
                .ok_or_else(|| JobError::NotFound {
                    job_id: job_id.to_string(),
                })?;

        // Finished results are also written to the cache here, keyed by the
        // bare job id. The cache-first check above derives its key from the
        // request parameters, so it never reads these entries.
        if record.status == JobStatus::Finished {
            if let Some(result) = &record.result {
                self.cache
                    .put(&job_key(job_id), result, self.result_ttl_secs)?;
            }
        }

        Ok(JobStatusResponse::from_record(record))
    }
}

impl std::fmt::Debug for AnalysisService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalysisService")
            .field("result_ttl_secs", &self.result_ttl_secs)
            .finish_non_exhaustive()
    }
}
