//! Expiring Cache - A file-backed key/value cache
//!
//! Stores caller payloads in a single JSON document with age-based
//! expiration, lazy filtering on reads, and whole-file write-through.

pub mod cache;
pub mod codec;
pub mod config;
pub mod error;
pub mod logger;
pub mod storage;

pub use cache::{ExpiringCache, GetOptions, InitializeOptions};
pub use config::CacheOptions;
pub use error::{CacheError, ConfigError, Result};
