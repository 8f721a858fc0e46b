//! Environment-driven configuration.
//!
//! All runtime knobs come from environment variables, with a `.env` file
//! loaded first when present. The presence or absence of `REDIS_URL` is what
//! later selects the durable versus local execution regime; nothing here
//! opens a connection.

use std::path::PathBuf;

/// Default reasoner model when `MODEL_REASONER` is unset.
pub const DEFAULT_MODEL_REASONER: &str = "gemini-1.5-pro";

/// Default data directory when `DATA_DIR` is unset.
pub const DEFAULT_DATA_DIR: &str = "backend/data";

/// Default cache directory when `CACHE_DIR` is unset.
pub const DEFAULT_CACHE_DIR: &str = "backend/cache";

/// Runtime configuration for the Landmark backend.
#[derive(Debug, Clone)]
pub struct LandmarkConfig {
    /// Durable queue connection string. Absent means local regime.
    pub redis_url: Option<String>,

    /// API credential for the external LLM reasoner.
    pub gemini_api_key: Option<String>,

    /// Model identifier for the external LLM reasoner.
    pub model_reasoner: String,

    /// Directory holding the amenity/permit/sales/zoning/climate data files.
    pub data_dir: PathBuf,

    /// Directory holding one file per cached analysis result.
    pub cache_dir: PathBuf,
}

impl Default for LandmarkConfig {
    fn default() -> Self {
        Self {
            redis_url: None,
            gemini_api_key: None,
            model_reasoner: DEFAULT_MODEL_REASONER.to_string(),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            cache_dir: PathBuf::from(DEFAULT_CACHE_DIR),
        }
    }
}

impl LandmarkConfig {
    /// Create LandmarkConfig from environment variables.
    ///
    /// Loads a `.env` file first if one exists (ignored when absent).
    ///
    /// # Environment Variables
    /// - `REDIS_URL`: durable queue connection string (absent = local regime)
    /// - `GEMINI_API_KEY`: LLM reasoner credential
    /// - `MODEL_REASONER`: LLM model identifier (default: gemini-1.5-pro)
    /// - `DATA_DIR`: data file directory (default: backend/data)
    /// - `CACHE_DIR`: result cache directory (default: backend/cache)
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();

        let redis_url = std::env::var("REDIS_URL").ok().filter(|s| !s.is_empty());

        let gemini_api_key = std::env::var("GEMINI_API_KEY")
            .ok()
            .filter(|s| !s.is_empty());

        let model_reasoner = std::env::var("MODEL_REASONER")
            .ok()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_MODEL_REASONER.to_string());

        let data_dir = std::env::var("DATA_DIR")
            .ok()
            .filter(|s| !s.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));

        let cache_dir = std::env::var("CACHE_DIR")
            .ok()
            .filter(|s| !s.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CACHE_DIR));

        Self {
            redis_url,
            gemini_api_key,
            model_reasoner,
            data_dir,
            cache_dir,
        }
    }

    /// Whether a durable queue backend is configured at all.
    ///
    /// Configuration is necessary but not sufficient for the durable regime;
    /// the backend must also be reachable at startup.
    pub fn durable_configured(&self) -> bool {
        self.redis_url.is_some()
    }
}

// =============================================================================
// TESTS
// =============================================================================
