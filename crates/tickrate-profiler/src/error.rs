//! Error types for the profiling engine.
//!
//! None of these are fatal. Insufficient data is not an error at all (it is
//! an invalid [`Snapshot`](crate::Snapshot)); everything else is a typed,
//! inspectable outcome the caller turns into a message or a fallback.

use thiserror::Error;

/// Errors that can occur while querying or configuring the profiler.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProfilerError {
    /// No window is registered under the requested name.
    #[error("Window not found: {0}")]
    WindowNotFound(String),

    /// A composite report was requested but one of its windows does not
    /// hold enough samples yet.
    #[error("Report unavailable: window '{window}' has fewer than 2 samples")]
    ReportUnavailable {
        /// The first window that could not produce a valid snapshot.
        window: String,
    },

    /// A time interval string could not be parsed.
    #[error("Invalid time interval: '{0}'")]
    InvalidInterval(String),

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A configuration file could not be read or decoded.
    #[error("Failed to load configuration: {0}")]
    ConfigLoad(String),
}

impl ProfilerError {
    /// Create a window not found error.
    #[must_use]
    pub fn window_not_found(name: impl Into<String>) -> Self {
        Self::WindowNotFound(name.into())
    }

    /// Create a report unavailable error.
    #[must_use]
    pub fn report_unavailable(window: impl Into<String>) -> Self {
        Self::ReportUnavailable {
            window: window.into(),
        }
    }

    /// Create an invalid interval error.
    #[must_use]
    pub fn invalid_interval(interval: impl Into<String>) -> Self {
        Self::InvalidInterval(interval.into())
    }

    /// Create an invalid configuration error.
    #[must_use]
    pub fn invalid_configuration(reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration(reason.into())
    }

    /// Create a configuration load error with context.
    #[must_use]
    pub fn config_load(context: impl std::fmt::Display) -> Self {
        Self::ConfigLoad(context.to_string())
    }

    /// Whether retrying later may succeed without any change by the caller.
    ///
    /// Only an unavailable report qualifies: windows fill up as ticks arrive.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::ReportUnavailable { .. })
    }
}

/// A specialized `Result` type for profiler operations.
pub type ProfilerResult<T> = std::result::Result<T, ProfilerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ProfilerError::window_not_found("chunkgen");
        assert!(err.to_string().contains("chunkgen"));

        let err = ProfilerError::report_unavailable("shortest");
        assert!(err.to_string().contains("shortest"));

        let err = ProfilerError::invalid_interval("5 fortnights");
        assert!(err.to_string().contains("5 fortnights"));
    }

    #[test]
    fn test_error_constructors() {
        let err = ProfilerError::invalid_configuration("history_capacity must be greater than 0");
        assert!(matches!(err, ProfilerError::InvalidConfiguration(_)));

        let err = ProfilerError::config_load("missing file");
        assert_eq!(err, ProfilerError::ConfigLoad("missing file".to_string()));
    }

    #[test]
    fn test_error_is_transient() {
        assert!(ProfilerError::report_unavailable("short").is_transient());
        assert!(!ProfilerError::window_not_found("x").is_transient());
        assert!(!ProfilerError::invalid_interval("x").is_transient());
    }
}
