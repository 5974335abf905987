//! Error types for the expiring cache
//!
//! Provides unified error handling using thiserror. Read-path failures are
//! reported as [`CacheError::Hydration`], write-path failures as
//! [`CacheError::Persistence`].

use std::io;
use std::path::PathBuf;

use thiserror::Error;

// == Codec Error ==
/// Failure to turn a cache document into text or back.
#[derive(Error, Debug)]
pub enum CodecError {
    /// The JSON codec rejected the document
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// A custom codec rejected the document
    #[error("{0}")]
    Other(String),
}

// == Hydration Cause ==
/// Why loading the persisted cache failed.
#[derive(Error, Debug)]
pub enum HydrationCause {
    /// Missing or unreadable file
    #[error("read failed: {0}")]
    Read(#[source] io::Error),

    /// Content is not a valid cache document
    #[error("malformed content: {0}")]
    Decode(#[source] CodecError),
}

// == Persistence Cause ==
/// Why writing the cache snapshot failed.
#[derive(Error, Debug)]
pub enum PersistenceCause {
    /// Parent directory could not be created
    #[error("directory creation failed: {0}")]
    CreateDir(#[source] io::Error),

    /// In-memory map could not be encoded
    #[error("encoding failed: {0}")]
    Encode(#[source] CodecError),

    /// File could not be written
    #[error("write failed: {0}")]
    Write(#[source] io::Error),
}

// == Config Error ==
/// Rejected cache configuration.
#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    /// Expiry must be a finite number of days, zero or more
    #[error("cache entry expiry must be a finite, non-negative number of days, got {0}")]
    InvalidExpireAfterDays(f64),

    /// Environment variable holds something that is not a number
    #[error("{name} is not a valid number: '{value}'")]
    InvalidNumber { name: &'static str, value: String },
}

// == Cache Error Enum ==
/// Unified error type for the cache.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Persisted snapshot could not be loaded
    #[error("Could not read cache file at {}: {source}", .path.display())]
    Hydration {
        path: PathBuf,
        source: HydrationCause,
    },

    /// Snapshot could not be written to disk
    #[error("Could not write cache file at {}: {source}", .path.display())]
    Persistence {
        path: PathBuf,
        source: PersistenceCause,
    },
}

impl CacheError {
    /// Path of the backing file involved in the failure.
    pub fn path(&self) -> &PathBuf {
        match self {
            CacheError::Hydration { path, .. } | CacheError::Persistence { path, .. } => path,
        }
    }

    /// Returns true for read-path failures.
    pub fn is_hydration(&self) -> bool {
        matches!(self, CacheError::Hydration { .. })
    }

    /// Returns true for write-path failures.
    pub fn is_persistence(&self) -> bool {
        matches!(self, CacheError::Persistence { .. })
    }
}

// == Result Type Alias ==
/// Convenience Result type for cache operations.
pub type Result<T> = std::result::Result<T, CacheError>;
