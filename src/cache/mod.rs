//! Caching subsystem.
//!
//! The cache policy selects a single in-process backend. Each process
//! instance owns its own storage, so horizontally scaled deployments do
//! not see each other's entries.

pub mod local_memory;

use thiserror::Error;

pub use local_memory::{LocalMemoryCache, Timeout};

/// Errors returned by cache operations.
#[derive(Debug, Error)]
pub enum CacheError {
    /// A value could not be encoded on write or decoded into the requested type.
    #[error("cache value serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}
