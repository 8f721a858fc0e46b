//! Landmark Cache - File-Backed Result Cache
//!
//! Short-circuits repeated identical analysis requests. One file per entry,
//! named by a digest of the request parameters, containing the serialized
//! `{result, cached_at, ttl}` record.
//!
//! # Expiry
//!
//! There is no background sweeper. Reads are responsible for lazy eviction:
//! a read past the entry's TTL (or of a file that no longer parses) reports
//! a miss and deletes the file. Entries otherwise accumulate until read or
//! manually removed; there is no capacity bound or LRU.
//!
//! # Concurrency
//!
//! The cache directory is shared mutable state on disk. Concurrent writers
//! to the same key are not coordinated (last write wins); entries are
//! re-derivable, never a source of truth.

pub mod key;
pub mod store;

pub use key::{job_key, request_key};
pub use store::{CacheStats, ResultCache};
