//! Landmark Core - Shared Types
//!
//! Data types, error taxonomy, and configuration shared by every Landmark
//! crate. This crate contains no I/O beyond reading environment variables;
//! the cache, job, and pipeline layers all depend on it.

pub mod analysis;
pub mod analyzer;
pub mod config;
pub mod error;
pub mod job;

pub use analysis::{AnalysisMemo, AnalysisRequest, MemoInput, MemoMetrics};
pub use analyzer::Analyzer;
pub use config::LandmarkConfig;
pub use error::{
    CacheError, ConfigError, JobError, LandmarkError, LandmarkResult, PipelineError,
    ReasonerError,
};
pub use job::{new_job_id, JobRecord, JobStatus};

/// Timestamp type using UTC timezone.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
