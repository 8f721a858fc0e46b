//! The on-disk store.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use landmark_core::{CacheError, LandmarkResult};

/// On-disk shape of one entry: `<key>.json` in the cache directory.
#[derive(Debug, Serialize, Deserialize)]
struct CacheEntry {
    result: Value,
    /// Unix seconds at write time (fractional).
    cached_at: f64,
    /// Validity window in seconds.
    ttl: u64,
}

/// Counters for cache effectiveness.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub expirations: u64,
    pub corruptions: u64,
}

impl CacheStats {
    /// Calculate the hit rate (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// File-backed TTL cache for analysis results.
///
/// `get` performs lazy eviction: expired and corrupt entries are deleted on
/// read and reported as misses. `put` overwrites unconditionally.
#[derive(Debug)]
pub struct ResultCache {
    dir: PathBuf,
    hits: AtomicU64,
    misses: AtomicU64,
    expirations: AtomicU64,
    corruptions: AtomicU64,
}

impl ResultCache {
    /// Create a cache rooted at `dir`. The directory is created lazily on
    /// the first write, not here.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            expirations: AtomicU64::new(0),
            corruptions: AtomicU64::new(0),
        }
    }

    /// The directory this cache writes into.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the entry file for `key`.
    pub fn entry_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }

    /// Persist `value` under `key` with a validity window of `ttl_seconds`.
    ///
    /// Replaces any existing entry for the key unconditionally.
    ///
    /// # Errors
    /// Propagates I/O and serialization failures; the write path does not
    /// self-heal the way reads do.
    pub fn put(&self, key: &str, value: &Value, ttl_seconds: u64) -> LandmarkResult<()> {
        fs::create_dir_all(&self.dir).map_err(|source| CacheError::Io {
            key: key.to_string(),
            source,
        })?;

        let entry = CacheEntry {
            result: value.clone(),
            cached_at: unix_now(),
            ttl: ttl_seconds,
        };

        let bytes = serde_json::to_vec(&entry).map_err(|e| CacheError::Serialization {
            key: key.to_string(),
            reason: e.to_string(),
        })?;

        fs::write(self.entry_path(key), bytes).map_err(|source| CacheError::Io {
            key: key.to_string(),
            source,
        })?;

        tracing::debug!(key, ttl_seconds, "Cached analysis result");
        Ok(())
    }

    /// Read the value stored under `key`, or `None` on a miss.
    ///
    /// Misses include: no entry, an entry older than its TTL (the stale file
    /// is deleted), and an entry that no longer parses (the corrupt file is
    /// deleted). None of these raise.
    pub fn get(&self, key: &str) -> Option<Value> {
        let path = self.entry_path(key);

        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(_) => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                return None;
            }
        };

        let entry: CacheEntry = match serde_json::from_slice(&bytes) {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(key, error = %e, "Removing corrupt cache entry");
                self.corruptions.fetch_add(1, Ordering::Relaxed);
                self.misses.fetch_add(1, Ordering::Relaxed);
                let _ = fs::remove_file(&path);
                return None;
            }
        };

        let age = unix_now() - entry.cached_at;
        if age > entry.ttl as f64 {
            tracing::debug!(key, age_secs = age, ttl = entry.ttl, "Cache entry expired");
            self.expirations.fetch_add(1, Ordering::Relaxed);
            self.misses.fetch_add(1, Ordering::Relaxed);
            let _ = fs::remove_file(&path);
            return None;
        }

        self.hits.fetch_add(1, Ordering::Relaxed);
        Some(entry.result)
    }

    /// Delete the entry for `key` if present. Absence is not an error.
    pub fn remove(&self, key: &str) {
        let _ = fs::remove_file(self.entry_path(key));
    }

    /// Snapshot of the hit/miss counters since construction.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            expirations: self.expirations.load(Ordering::Relaxed),
            corruptions: self.corruptions.load(Ordering::Relaxed),
        }
    }
}

fn unix_now() -> f64 {
    chrono::Utc::now().timestamp_millis() as f64 / 1000.0
}

// =============================================================================
// TESTS
// =============================================================================
