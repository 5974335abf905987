//! Cache Module
//!
//! Provides a file-backed key/value cache with age-based expiration.

mod entry;
mod options;
mod store;


// Re-export public types
pub use entry::{CacheEntry, MS_IN_A_DAY};
pub use options::{GetOptions, InitializeOptions};
pub use store::{CacheDocument, ExpiringCache};
