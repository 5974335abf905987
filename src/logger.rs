//! Logger Module
//!
//! Diagnostic sink used by the cache. Both methods default to no-ops, so an
//! implementor only overrides the levels it cares about.

use std::fmt;

use serde_json::Value;

// == Cache Logger ==
/// Receives leveled diagnostic messages with optional structured metadata.
pub trait CacheLogger: Send + Sync + fmt::Debug {
    /// Low-importance message, e.g. skipped writes or directory creation.
    fn debug(&self, _message: &str, _meta: Option<&Value>) {}

    /// Recoverable problem, e.g. an unreadable cache file.
    fn warn(&self, _message: &str, _meta: Option<&Value>) {}
}

// == Tracing Logger ==
/// Forwards cache diagnostics to `tracing`, tagged with a component name.
#[derive(Debug, Clone)]
pub struct TracingLogger {
    component: String,
}

impl TracingLogger {
    pub fn new(component: impl Into<String>) -> Self {
        Self {
            component: component.into(),
        }
    }

    pub fn component(&self) -> &str {
        &self.component
    }
}

impl Default for TracingLogger {
    fn default() -> Self {
        Self::new("ExpiringCache")
    }
}

impl CacheLogger for TracingLogger {
    fn debug(&self, message: &str, meta: Option<&Value>) {
        match meta {
            Some(meta) => tracing::debug!(component = %self.component, %meta, "{}", message),
            None => tracing::debug!(component = %self.component, "{}", message),
        }
    }

    fn warn(&self, message: &str, meta: Option<&Value>) {
        match meta {
            Some(meta) => tracing::warn!(component = %self.component, %meta, "{}", message),
            None => tracing::warn!(component = %self.component, "{}", message),
        }
    }
}

// == Noop Logger ==
/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLogger;

impl CacheLogger for NoopLogger {}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Mutex;

    use super::*;

    /// Records every message so tests can assert on what was logged.
    #[derive(Debug, Default)]
    pub struct RecordingLogger {
        pub records: Mutex<Vec<(&'static str, String)>>,
    }

    impl RecordingLogger {
        pub fn messages(&self, level: &str) -> Vec<String> {
            self.records
                .lock()
                .unwrap()
                .iter()
                .filter(|(l, _)| *l == level)
                .map(|(_, m)| m.clone())
                .collect()
        }
    }

    impl CacheLogger for RecordingLogger {
        fn debug(&self, message: &str, _meta: Option<&Value>) {
            self.records.lock().unwrap().push(("debug", message.to_string()));
        }

        fn warn(&self, message: &str, _meta: Option<&Value>) {
            self.records.lock().unwrap().push(("warn", message.to_string()));
        }
    }
}
