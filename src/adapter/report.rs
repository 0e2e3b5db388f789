//! Batch results for data and helper loading.

use std::fmt;
use tracing::warn;

/// One file (or capability) that could not be loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadFailure {
    /// File path or capability name
    pub source: String,
    /// Why it failed
    pub error: String,
}

impl fmt::Display for LoadFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.source, self.error)
    }
}

/// Outcome of a batch load. Failures never abort the batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Names registered successfully, in load order
    pub loaded: Vec<String>,
    /// Entries that failed, in load order
    pub failures: Vec<LoadFailure>,
}

impl LoadReport {
    /// True when nothing failed.
    pub fn is_ok(&self) -> bool {
        self.failures.is_empty()
    }

    pub(crate) fn success(&mut self, name: impl Into<String>) {
        self.loaded.push(name.into());
    }

    /// Records a failure and logs it as a warning.
    pub(crate) fn failure(&mut self, kind: &str, source: impl Into<String>, error: impl fmt::Display) {
        let failure = LoadFailure {
            source: source.into(),
            error: error.to_string(),
        };
        warn!("Failed to load {} {}", kind, failure);
        self.failures.push(failure);
    }

    /// Appends another report to this one.
    pub fn extend(&mut self, other: LoadReport) {
        self.loaded.extend(other.loaded);
        self.failures.extend(other.failures);
    }
}
