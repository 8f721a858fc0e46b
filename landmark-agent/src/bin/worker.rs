//! Durable-regime analysis worker.
//!
//! Connects to the configured Redis queue, builds the production pipeline,
//! and processes jobs until interrupted. Run one or more of these alongside
//! the API process when `REDIS_URL` is set.

use std::sync::Arc;

use tokio::sync::watch;
use tracing_subscriber::EnvFilter;

use landmark_agent::AnalysisPipeline;
use landmark_core::{Analyzer, LandmarkConfig};
use landmark_jobs::{run_worker, RedisJobQueue, WorkerConfig};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = LandmarkConfig::from_env();

    let Some(redis_url) = config.redis_url.clone() else {
        tracing::error!("REDIS_URL is not set; the worker only serves the durable regime");
        std::process::exit(2);
    };

    let queue = match RedisJobQueue::connect(&redis_url).await {
        Ok(queue) => queue,
        Err(e) => {
            tracing::error!(error = %e, "Could not reach the durable queue");
            std::process::exit(1);
        }
    };

    let pipeline = match AnalysisPipeline::from_config(&config) {
        Ok(pipeline) => pipeline,
        Err(e) => {
            tracing::error!(error = %e, "Could not build the analysis pipeline");
            std::process::exit(1);
        }
    };
    let analyzer: Arc<dyn Analyzer> = Arc::new(pipeline);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let worker = tokio::spawn(run_worker(
        queue,
        analyzer,
        WorkerConfig::default(),
        shutdown_rx,
    ));

    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Interrupt received; shutting down"),
        Err(e) => tracing::error!(error = %e, "Failed to listen for interrupt"),
    }

    let _ = shutdown_tx.send(true);
    let _ = worker.await;
}
