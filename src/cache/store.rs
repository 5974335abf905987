//! Cache Store Module
//!
//! Main cache engine: an insertion-ordered map with age-based expiration and
//! whole-file write-through on every mutation.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::json;

use crate::cache::{CacheEntry, GetOptions, InitializeOptions};
use crate::codec::{Codec, JsonCodec};
use crate::config::CacheOptions;
use crate::error::{CacheError, HydrationCause, PersistenceCause, Result};
use crate::storage::{FileSystem, TokioFileSystem};

/// The whole persisted unit: cache key to entry, in insertion order.
pub type CacheDocument<T> = IndexMap<String, CacheEntry<T>>;

// == Expiring Cache ==
/// File-backed key/value cache with lazy age-based expiration.
///
/// Reads never touch the filesystem. Every mutation rewrites the complete
/// backing file; the in-memory map is updated first, so after a failed write
/// the cache is ahead of disk until the next successful one.
///
/// The cache assumes it is the only writer of its file. Nothing guards
/// against other processes rewriting it concurrently.
#[derive(Debug)]
pub struct ExpiringCache<T, S = TokioFileSystem, C = JsonCodec> {
    /// Key-value storage
    entries: CacheDocument<T>,
    /// Resolved configuration
    options: CacheOptions,
    /// Filesystem backend
    storage: S,
    /// Document encoding
    codec: C,
}

impl<T> ExpiringCache<T> {
    // == Constructor ==
    /// Creates an empty cache backed by the local filesystem and JSON.
    ///
    /// Does not touch the filesystem; call [`initialize`](Self::initialize)
    /// to load a previous snapshot.
    pub fn new(options: CacheOptions) -> Self {
        Self::with_backend(options, TokioFileSystem, JsonCodec)
    }
}

impl<T, S, C> ExpiringCache<T, S, C> {
    /// Creates an empty cache with an explicit storage backend and codec.
    pub fn with_backend(options: CacheOptions, storage: S, codec: C) -> Self {
        Self {
            entries: IndexMap::new(),
            options,
            storage,
            codec,
        }
    }

    pub fn options(&self) -> &CacheOptions {
        &self.options
    }

    // == Is Expired ==
    /// Checks if the entry for `key` is unusable.
    ///
    /// A missing key counts as expired. With a maximum age of 0 days, present
    /// entries never expire.
    pub fn is_expired(&self, key: &str) -> bool {
        self.is_expired_at(key, Utc::now())
    }

    fn is_expired_at(&self, key: &str, now: DateTime<Utc>) -> bool {
        match self.entries.get(key) {
            Some(entry) => entry.is_expired_at(self.options.cache_entry_expire_after_days, now),
            None => true,
        }
    }

    // == Get ==
    /// Retrieves the payload for `key`, hiding expired entries.
    pub fn get(&self, key: &str) -> Option<&T> {
        self.get_with(key, GetOptions::default())
    }

    /// Retrieves the payload for `key` with explicit read options.
    pub fn get_with(&self, key: &str, options: GetOptions) -> Option<&T> {
        self.lookup(key, options, Utc::now())
    }

    fn lookup(&self, key: &str, options: GetOptions, now: DateTime<Utc>) -> Option<&T> {
        if options.exclude_expired_entries && self.is_expired_at(key, now) {
            return None;
        }
        self.entries.get(key).map(|entry| &entry.data)
    }

    /// Last write time of `key`, whether or not it has expired.
    pub fn updated_at(&self, key: &str) -> Option<DateTime<Utc>> {
        self.entries.get(key).map(|entry| entry.updated_at)
    }

    // == Keys ==
    /// Keys of non-expired entries, in insertion order.
    pub fn get_keys(&self) -> Vec<&str> {
        self.get_keys_with(GetOptions::default())
    }

    pub fn get_keys_with(&self, options: GetOptions) -> Vec<&str> {
        let now = Utc::now();
        self.entries
            .keys()
            .filter(|key| !options.exclude_expired_entries || !self.is_expired_at(key, now))
            .map(String::as_str)
            .collect()
    }

    // == Entries ==
    /// `(key, payload)` pairs of non-expired entries, in insertion order.
    pub fn get_entries(&self) -> Vec<(&str, &T)> {
        self.get_entries_with(GetOptions::default())
    }

    pub fn get_entries_with(&self, options: GetOptions) -> Vec<(&str, &T)> {
        let now = Utc::now();
        self.entries
            .iter()
            .filter(|(key, _)| !options.exclude_expired_entries || !self.is_expired_at(key, now))
            .map(|(key, entry)| (key.as_str(), &entry.data))
            .collect()
    }

    // == For Each ==
    /// Calls `callback` for every key, passing `None` for expired payloads.
    ///
    /// Unlike [`get_keys`](Self::get_keys) and [`get_entries`](Self::get_entries),
    /// expired keys are still visited; only their value is withheld.
    pub fn for_each<F>(&self, callback: F)
    where
        F: FnMut(&str, Option<&T>),
    {
        self.for_each_with(callback, GetOptions::default());
    }

    pub fn for_each_with<F>(&self, mut callback: F, options: GetOptions)
    where
        F: FnMut(&str, Option<&T>),
    {
        let now = Utc::now();
        for key in self.entries.keys() {
            callback(key, self.lookup(key, options, now));
        }
    }

    // == Length ==
    /// Number of stored entries, expired ones included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T, S, C> ExpiringCache<T, S, C>
where
    T: Serialize + DeserializeOwned,
    S: FileSystem,
    C: Codec,
{
    // == Set ==
    /// Stores `value` under `key`, stamped with the current time, then
    /// persists the whole cache.
    ///
    /// The map is updated before the write starts, so the value is readable
    /// even if persistence fails.
    pub async fn set(&mut self, key: impl Into<String>, value: T) -> Result<()> {
        self.entries.insert(key.into(), CacheEntry::new(value));
        self.write_cache().await
    }

    // == Clear ==
    /// Removes every entry and persists the empty cache.
    pub async fn clear(&mut self) -> Result<()> {
        self.entries.clear();
        self.write_cache().await
    }

    // == Initialize ==
    /// Loads the persisted snapshot, dropping expired entries.
    ///
    /// Read failures leave the cache empty and are only logged.
    pub async fn initialize(&mut self) -> Result<()> {
        self.initialize_with(InitializeOptions::default()).await
    }

    /// Loads the persisted snapshot, replacing everything held in memory.
    ///
    /// Any read or decode failure empties the cache and logs a warning; the
    /// error is returned only when `throw_on_error` is set. A failure to
    /// persist the pruned snapshot is always returned.
    pub async fn initialize_with(&mut self, options: InitializeOptions) -> Result<()> {
        if self.options.disable_cache {
            self.options
                .logger
                .debug("Cache is disabled; skipping initialization.", None);
            return Ok(());
        }

        match self.load().await {
            Ok(entries) => self.entries = entries,
            Err(err) => {
                self.entries.clear();
                self.options.logger.warn(
                    &format!(
                        "Could not read cache file at {}, starting with empty cache.",
                        self.options.cache_file_path.display()
                    ),
                    Some(&json!({ "error": err.to_string() })),
                );
                return if options.throw_on_error { Err(err) } else { Ok(()) };
            }
        }

        if options.exclude_expired_entries {
            self.prune_expired().await?;
        }
        Ok(())
    }

    // == Prune Expired ==
    /// Removes all expired entries, persisting once if anything was removed.
    ///
    /// Returns the number of entries removed.
    pub async fn prune_expired(&mut self) -> Result<usize> {
        let now = Utc::now();
        let max_age_days = self.options.cache_entry_expire_after_days;
        let before = self.entries.len();

        self.entries
            .retain(|_, entry| !entry.is_expired_at(max_age_days, now));

        let removed = before - self.entries.len();
        if removed > 0 {
            self.options.logger.debug(
                &format!("Pruned {} expired cache entries", removed),
                None,
            );
            self.write_cache().await?;
        }
        Ok(removed)
    }

    async fn load(&self) -> Result<CacheDocument<T>> {
        let path = &self.options.cache_file_path;
        let content = self
            .storage
            .read_to_string(path)
            .await
            .map_err(|e| CacheError::Hydration {
                path: path.clone(),
                source: HydrationCause::Read(e),
            })?;

        self.codec
            .decode(&content)
            .map_err(|e| CacheError::Hydration {
                path: path.clone(),
                source: HydrationCause::Decode(e),
            })
    }

    async fn write_cache(&self) -> Result<()> {
        let logger = &self.options.logger;
        if self.options.disable_cache {
            logger.debug("Cache is disabled; skipping write.", None);
            return Ok(());
        }

        let path = &self.options.cache_file_path;
        let persistence_error = |source| CacheError::Persistence {
            path: path.clone(),
            source,
        };

        if let Some(directory) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            if !self.storage.exists(directory).await {
                logger.debug(
                    &format!("Creating cache directory at {}", directory.display()),
                    None,
                );
                self.storage
                    .create_dir_all(directory)
                    .await
                    .map_err(|e| persistence_error(PersistenceCause::CreateDir(e)))?;
            }
        }

        let content = self
            .codec
            .encode(&self.entries, self.options.prettify_cache_file)
            .map_err(|e| persistence_error(PersistenceCause::Encode(e)))?;

        logger.debug(
            &format!("Writing cache to {}", path.display()),
            Some(&json!({ "entries": self.entries.len() })),
        );
        self.storage
            .write(path, &content)
            .await
            .map_err(|e| persistence_error(PersistenceCause::Write(e)))
    }
}
