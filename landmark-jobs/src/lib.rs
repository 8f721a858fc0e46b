//! Landmark Jobs - Dispatch and Status Tracking
//!
//! The asynchronous core of the Landmark backend. An analysis request enters
//! through the [`AnalysisService`], which checks the result cache and then
//! hands the work to the [`JobDispatcher`]. The dispatcher runs in one of two
//! regimes, chosen exactly once at process start:
//!
//! - **Durable**: jobs are pushed to a Redis-backed queue and executed by
//!   separate worker processes (see [`run_worker`]). Jobs survive a restart
//!   of the dispatching process.
//! - **Local**: jobs execute as concurrently scheduled tasks inside the
//!   process that accepted them, against an in-memory [`JobRegistry`]. State
//!   is lost on restart.
//!
//! The two regimes never mix within one running process, and status lookups
//! never fall back across them.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use landmark_cache::ResultCache;
//! use landmark_core::{AnalysisRequest, LandmarkConfig};
//! use landmark_jobs::{AnalysisService, ExecutionBackend};
//!
//! let config = LandmarkConfig::from_env();
//! let backend = Arc::new(ExecutionBackend::resolve(&config).await);
//! let cache = Arc::new(ResultCache::new(&config.cache_dir));
//! let service = AnalysisService::new(backend, analyzer, cache);
//!
//! let response = service
//!     .analyze_async(AnalysisRequest::new("350 Fifth Ave, New York, NY", 800, false))
//!     .await?;
//! // ... poll service.result(&response.job_id) until terminal
//! ```

pub mod backend;
pub mod dispatcher;
pub mod durable;
pub mod registry;
pub mod service;
pub mod store;
pub mod worker;

pub use backend::ExecutionBackend;
pub use dispatcher::JobDispatcher;
pub use durable::RedisJobQueue;
pub use registry::JobRegistry;
pub use service::{AnalysisService, EnqueueResponse, JobStatusResponse, CACHED_JOB_ID};
pub use store::JobStore;
pub use worker::{run_worker, WorkerConfig, WorkerMetrics};
