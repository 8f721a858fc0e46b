//! The execution-unit boundary.
//!
//! The job layer treats analysis as an opaque async function: it may take
//! seconds, it may fail, and whatever it returns or raises is recorded on the
//! job. Implementations live in `landmark-agent`; tests substitute mocks.

use async_trait::async_trait;

use crate::analysis::{AnalysisMemo, AnalysisRequest};
use crate::error::LandmarkResult;

/// One full analysis run for a request.
///
/// Implementations must be thread-safe; the dispatcher shares a single
/// analyzer across every concurrently executing job.
#[async_trait]
pub trait Analyzer: Send + Sync {
    /// Run the analysis for `request` and produce the investment memo.
    ///
    /// # Errors
    /// Any error is captured by the caller (dispatcher or worker) and stored
    /// on the job record; it is never re-raised to status pollers.
    async fn run(&self, request: &AnalysisRequest) -> LandmarkResult<AnalysisMemo>;
}
