//! Execution backend selection.

use std::sync::Arc;

use landmark_core::LandmarkConfig;

use crate::durable::RedisJobQueue;
use crate::registry::JobRegistry;

/// Where jobs execute, resolved exactly once at process start.
///
/// `Durable` hands jobs to the Redis queue for separate worker processes;
/// `Local` runs them as tasks inside this process against the in-memory
/// registry. The choice is never re-checked per call, and status lookups
/// never fall back from one variant to the other.
#[derive(Debug)]
pub enum ExecutionBackend {
    Durable(RedisJobQueue),
    Local(Arc<JobRegistry>),
}

impl ExecutionBackend {
    /// Resolve the backend from configuration.
    ///
    /// A configured `REDIS_URL` selects the durable regime only when the
    /// queue is actually reachable at this moment; a configured but
    /// unreachable queue falls back to the local regime for the lifetime of
    /// the process.
    pub async fn resolve(config: &LandmarkConfig) -> Self {
        match &config.redis_url {
            Some(url) => match RedisJobQueue::connect(url).await {
                Ok(queue) => {
                    tracing::info!("Durable queue backend selected");
                    ExecutionBackend::Durable(queue)
                }
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        "Durable queue configured but unreachable; using local execution"
                    );
                    Self::local()
                }
            },
            None => {
                tracing::info!("No durable queue configured; using local execution");
                Self::local()
            }
        }
    }

    /// Build a local backend with a fresh registry.
    pub fn local() -> Self {
        ExecutionBackend::Local(Arc::new(JobRegistry::new()))
    }

    /// Build a local backend around an existing registry.
    ///
    /// Lets the process owner construct the registry at startup and keep a
    /// handle for shutdown and inspection.
    pub fn local_with(registry: Arc<JobRegistry>) -> Self {
        ExecutionBackend::Local(registry)
    }

    /// Whether this backend survives a restart of the dispatching process.
    pub fn is_durable(&self) -> bool {
        matches!(self, ExecutionBackend::Durable(_))
    }
}

// =============================================================================
// TESTS
// =============================================================================
