//! Core error types for pomo-core.
//!
//! Repository backends report [`RepositoryError`], the interval engine reports
//! [`IntervalError`] and the settings file reports [`SettingsError`].
//! [`CoreError`] wraps all of them for callers that do not need to branch.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for pomo-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Repository-related errors
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    /// Interval engine errors
    #[error("Interval error: {0}")]
    Interval(#[from] IntervalError),

    /// Settings file errors
    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A day range that reaches past the supported calendar
    #[error("Cannot summarize {num_days} days ending {end_day}")]
    InvalidRange {
        end_day: chrono::NaiveDate,
        num_days: usize,
    },
}

/// Errors reported by a [`Repository`](crate::storage::Repository) backend.
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// No record carries the requested id
    #[error("Interval {0} not found")]
    NotFound(i64),

    /// The store holds no intervals yet
    #[error("No intervals recorded")]
    NoIntervals,

    /// Backend I/O or constraint failure
    #[error("Storage failure during {operation}: {source}")]
    Storage {
        operation: &'static str,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl RepositoryError {
    pub fn storage(
        operation: &'static str,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        RepositoryError::Storage {
            operation,
            source: source.into(),
        }
    }

    /// Expected empty-state conditions that callers branch on.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, RepositoryError::NotFound(_) | RepositoryError::NoIntervals)
    }
}

/// Errors reported by the interval engine.
#[derive(Error, Debug)]
pub enum IntervalError {
    /// Pause requested on an interval that is not running
    #[error("Interval is not running")]
    NotRunning,

    /// Resume requested on an interval that is not paused
    #[error("Interval is not paused")]
    NotPaused,

    /// Start requested on an interval that already left NotStarted
    #[error("Interval already started")]
    AlreadyStarted,

    /// The run was cancelled through its cancellation token
    #[error("Interval run cancelled")]
    Cancelled,

    /// A repository call failed while driving the interval
    #[error("{operation} failed: {source}")]
    Repository {
        operation: &'static str,
        #[source]
        source: RepositoryError,
    },
}

impl IntervalError {
    pub(crate) fn repository(operation: &'static str) -> impl FnOnce(RepositoryError) -> Self {
        move |source| IntervalError::Repository { operation, source }
    }
}

/// Settings file errors.
#[derive(Error, Debug)]
pub enum SettingsError {
    /// Failed to load settings
    #[error("Failed to load settings from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save settings
    #[error("Failed to save settings to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Failed to parse settings
    #[error("Failed to parse settings: {0}")]
    ParseFailed(String),

    /// Invalid or unknown settings key/value
    #[error("Invalid settings value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

impl From<rusqlite::Error> for RepositoryError {
    fn from(err: rusqlite::Error) -> Self {
        RepositoryError::storage("sqlite", err)
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repository_errors_keep_operation_context() {
        let err = IntervalError::repository("update")(RepositoryError::NotFound(7));
        assert_eq!(err.to_string(), "update failed: Interval 7 not found");
    }

    #[test]
    fn empty_state_conditions_are_recoverable() {
        assert!(RepositoryError::NoIntervals.is_recoverable());
        assert!(RepositoryError::NotFound(1).is_recoverable());
        assert!(!RepositoryError::storage("create", "disk full").is_recoverable());
    }
}
