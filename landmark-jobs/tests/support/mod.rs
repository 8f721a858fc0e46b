//! Shared test support: mock analyzers and polling helpers.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use landmark_core::{
    AnalysisMemo, AnalysisRequest, Analyzer, JobRecord, LandmarkError, LandmarkResult,
    PipelineError,
};
use landmark_jobs::JobStore;

/// What a mock analysis run should do once the delay has elapsed.
pub enum MockOutcome {
    Succeed,
    Fail,
}

/// Scriptable stand-in for the real pipeline.
pub struct MockAnalyzer {
    outcome: MockOutcome,
    delay: Duration,
    runs: AtomicUsize,
}

impl MockAnalyzer {
    pub fn succeeding() -> Self {
        Self {
            outcome: MockOutcome::Succeed,
            delay: Duration::ZERO,
            runs: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            outcome: MockOutcome::Fail,
            delay: Duration::ZERO,
            runs: AtomicUsize::new(0),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// How many times `run` has been invoked.
    pub fn runs(&self) -> usize {
        self.runs.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Analyzer for MockAnalyzer {
    async fn run(&self, request: &AnalysisRequest) -> LandmarkResult<AnalysisMemo> {
        self.runs.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        match self.outcome {
            MockOutcome::Succeed => Ok(AnalysisMemo {
                memo_markdown: format!(
                    "# Investment Memo: {}\n\nSolid fundamentals within {}m.\n\nVerdict: Buy",
                    request.address, request.radius_m
                ),
                verdict: "Buy".to_string(),
            }),
            MockOutcome::Fail => Err(LandmarkError::from(PipelineError::DataLookupFailed {
                tool: "comps".to_string(),
                reason: "sales data unreadable".to_string(),
            })),
        }
    }
}

/// Poll until the job reaches a terminal state, panicking after `timeout`.
pub async fn poll_until_terminal(store: &JobStore, job_id: &str, timeout: Duration) -> JobRecord {
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        if let Some(record) = store.get_status(job_id).await {
            if record.status.is_terminal() {
                return record;
            }
        }
        if tokio::time::Instant::now() >= deadline {
            panic!("job {} did not reach a terminal state in time", job_id);
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}
