//! Configuration Module
//!
//! Cache options resolved once at construction. Defaults are plain values on
//! the struct; the temp directory is looked up only when building defaults.

use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::ConfigError;
use crate::logger::{CacheLogger, TracingLogger};

/// Entries older than this many days are expired unless configured otherwise.
pub const DEFAULT_CACHE_MAX_AGE_DAYS: f64 = 90.0;

/// Application name used for the default cache file name.
pub const DEFAULT_APP_NAME: &str = "expiring";

/// Returns `<temp_dir>/<app>-cache.json`.
pub fn default_cache_file_path(temp_dir: &Path, app: &str) -> PathBuf {
    temp_dir.join(format!("{}-cache.json", app))
}

/// Cache configuration parameters.
#[derive(Debug, Clone)]
pub struct CacheOptions {
    /// Single backing file for the whole cache
    pub cache_file_path: PathBuf,
    /// Maximum entry age in days, fractions allowed; 0 disables expiration
    pub cache_entry_expire_after_days: f64,
    /// Write indented JSON instead of compact JSON
    pub prettify_cache_file: bool,
    /// Skip every filesystem operation
    pub disable_cache: bool,
    /// Diagnostic sink
    pub logger: Arc<dyn CacheLogger>,
}

impl CacheOptions {
    /// Defaults for `app`, with the cache file placed in `temp_dir`.
    pub fn for_app_in(app: &str, temp_dir: &Path) -> Self {
        Self {
            cache_file_path: default_cache_file_path(temp_dir, app),
            cache_entry_expire_after_days: DEFAULT_CACHE_MAX_AGE_DAYS,
            prettify_cache_file: false,
            disable_cache: false,
            logger: Arc::new(TracingLogger::default()),
        }
    }

    /// Defaults for `app`, with the cache file placed in the platform temp directory.
    pub fn for_app(app: &str) -> Self {
        Self::for_app_in(app, &env::temp_dir())
    }

    pub fn with_cache_file_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.cache_file_path = path.into();
        self
    }

    /// Sets the maximum entry age. `0.5` means twelve hours, `0` never expires.
    ///
    /// Negative, NaN and infinite values are rejected.
    pub fn with_expire_after_days(mut self, days: f64) -> Result<Self, ConfigError> {
        self.cache_entry_expire_after_days = validate_expire_after_days(days)?;
        Ok(self)
    }

    pub fn with_prettify(mut self, prettify: bool) -> Self {
        self.prettify_cache_file = prettify;
        self
    }

    pub fn with_disabled(mut self, disabled: bool) -> Self {
        self.disable_cache = disabled;
        self
    }

    pub fn with_logger(mut self, logger: Arc<dyn CacheLogger>) -> Self {
        self.logger = logger;
        self
    }

    /// Creates options by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `EXPIRING_CACHE_FILE` - Cache file path (default: `<tempdir>/expiring-cache.json`)
    /// - `EXPIRING_CACHE_EXPIRE_AFTER_DAYS` - Maximum entry age in days, may be fractional (default: 90)
    /// - `EXPIRING_CACHE_PRETTIFY` - Write indented JSON (default: false)
    /// - `EXPIRING_CACHE_DISABLE` - Disable persistence (default: false)
    ///
    /// An expiry that is not a number, or is negative or non-finite, is an error.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let cache_entry_expire_after_days = match env::var("EXPIRING_CACHE_EXPIRE_AFTER_DAYS") {
            Ok(raw) => parse_expire_after_days(&raw)?,
            Err(_) => defaults.cache_entry_expire_after_days,
        };
        Ok(Self {
            cache_file_path: env::var_os("EXPIRING_CACHE_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.cache_file_path),
            cache_entry_expire_after_days,
            prettify_cache_file: env::var("EXPIRING_CACHE_PRETTIFY")
                .ok()
                .and_then(|v| parse_flag(&v))
                .unwrap_or(defaults.prettify_cache_file),
            disable_cache: env::var("EXPIRING_CACHE_DISABLE")
                .ok()
                .and_then(|v| parse_flag(&v))
                .unwrap_or(defaults.disable_cache),
            logger: defaults.logger,
        })
    }
}

impl Default for CacheOptions {
    fn default() -> Self {
        Self::for_app(DEFAULT_APP_NAME)
    }
}

fn validate_expire_after_days(days: f64) -> Result<f64, ConfigError> {
    if days.is_finite() && days >= 0.0 {
        Ok(days)
    } else {
        Err(ConfigError::InvalidExpireAfterDays(days))
    }
}

fn parse_expire_after_days(raw: &str) -> Result<f64, ConfigError> {
    let days = raw
        .trim()
        .parse::<f64>()
        .map_err(|_| ConfigError::InvalidNumber {
            name: "EXPIRING_CACHE_EXPIRE_AFTER_DAYS",
            value: raw.to_string(),
        })?;
    validate_expire_after_days(days)
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
