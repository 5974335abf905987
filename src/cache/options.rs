//! Per-call options for reads and hydration.

/// Controls whether expired entries are visible to a read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GetOptions {
    /// Hide entries older than the configured maximum age
    pub exclude_expired_entries: bool,
}

impl GetOptions {
    /// Options that also return expired entries.
    pub fn include_expired() -> Self {
        Self {
            exclude_expired_entries: false,
        }
    }
}

impl Default for GetOptions {
    fn default() -> Self {
        Self {
            exclude_expired_entries: true,
        }
    }
}

/// Controls how [`ExpiringCache::initialize`](super::ExpiringCache::initialize) hydrates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InitializeOptions {
    /// Drop expired entries after loading and persist the pruned map
    pub exclude_expired_entries: bool,
    /// Return the read error instead of starting with an empty cache
    pub throw_on_error: bool,
}

impl Default for InitializeOptions {
    fn default() -> Self {
        Self {
            exclude_expired_entries: true,
            throw_on_error: false,
        }
    }
}
