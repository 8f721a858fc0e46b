//! Error types for Landmark operations

use thiserror::Error;

/// Job queue and dispatch errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum JobError {
    #[error("No execution backend available: {reason}")]
    QueueUnavailable { reason: String },

    #[error("Job not found: {job_id}")]
    NotFound { job_id: String },

    #[error("Job id {job_id} has no pollable record")]
    NotPollable { job_id: String },

    #[error("Job execution failed: {reason}")]
    ExecutionFailed { reason: String },
}

/// Result cache errors.
///
/// Corruption and expiry are handled inside the cache (a read self-heals and
/// reports a miss), so these surface only from the write path.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Cache I/O failed for key {key}: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Cache entry for key {key} could not be serialized: {reason}")]
    Serialization { key: String, reason: String },

    #[error("Cache entry for key {key} is corrupt")]
    Corrupted { key: String },
}

/// Analysis pipeline errors.
///
/// An address that geocodes to nothing is NOT an error; the pipeline returns
/// a memo-shaped value with an error verdict instead. `GeocodingFailed`
/// covers transport-level failures only.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PipelineError {
    #[error("Geocoding request for {address:?} failed: {reason}")]
    GeocodingFailed { address: String, reason: String },

    #[error("Data lookup {tool} failed: {reason}")]
    DataLookupFailed { tool: String, reason: String },
}

/// LLM reasoner errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ReasonerError {
    #[error("No reasoner API key configured")]
    MissingApiKey,

    #[error("Request to {provider} failed with status {status}: {message}")]
    RequestFailed {
        provider: String,
        status: u16,
        message: String,
    },

    #[error("Invalid response from {provider}: {reason}")]
    InvalidResponse { provider: String, reason: String },
}

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required configuration field: {field}")]
    MissingRequired { field: String },

    #[error("Invalid value for {field}: {value} - {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

/// Master error type for all Landmark errors.
#[derive(Debug, Error)]
pub enum LandmarkError {
    #[error("Job error: {0}")]
    Job(#[from] JobError),

    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    #[error("Reasoner error: {0}")]
    Reasoner(#[from] ReasonerError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// Result type alias for Landmark operations.
pub type LandmarkResult<T> = Result<T, LandmarkError>;

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_error_display_not_found() {
        let err = JobError::NotFound {
            job_id: "abc-123".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("Job not found"));
        assert!(msg.contains("abc-123"));
    }

    #[test]
    fn test_job_error_display_not_pollable() {
        let err = JobError::NotPollable {
            job_id: "cached".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("no pollable record"));
        assert!(msg.contains("cached"));
    }

    #[test]
    fn test_cache_error_display_corrupted() {
        let err = CacheError::Corrupted {
            key: "deadbeef".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("corrupt"));
        assert!(msg.contains("deadbeef"));
    }

    #[test]
    fn test_reasoner_error_display_request_failed() {
        let err = ReasonerError::RequestFailed {
            provider: "gemini".to_string(),
            status: 429,
            message: "quota exceeded".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("gemini"));
        assert!(msg.contains("429"));
        assert!(msg.contains("quota exceeded"));
    }

    #[test]
    fn test_landmark_error_from_variants() {
        let job = LandmarkError::from(JobError::QueueUnavailable {
            reason: "redis down".to_string(),
        });
        assert!(matches!(job, LandmarkError::Job(_)));

        let cache = LandmarkError::from(CacheError::Corrupted {
            key: "k".to_string(),
        });
        assert!(matches!(cache, LandmarkError::Cache(_)));

        let pipeline = LandmarkError::from(PipelineError::GeocodingFailed {
            address: "nowhere".to_string(),
            reason: "timeout".to_string(),
        });
        assert!(matches!(pipeline, LandmarkError::Pipeline(_)));

        let reasoner = LandmarkError::from(ReasonerError::MissingApiKey);
        assert!(matches!(reasoner, LandmarkError::Reasoner(_)));

        let config = LandmarkError::from(ConfigError::MissingRequired {
            field: "REDIS_URL".to_string(),
        });
        assert!(matches!(config, LandmarkError::Config(_)));
    }
}
