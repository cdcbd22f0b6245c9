//! Error types for the idle watchdog.
//!
//! State transitions never fail; misuse is a logged no-op. Errors only
//! arise while building configuration or parsing host input.

use thiserror::Error;

/// Errors that can occur while configuring the idle watchdog.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WatchdogError {
    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Host event name does not map to a known activity kind.
    #[error("Unknown activity kind: {0}")]
    InvalidActivityKind(String),
}

impl WatchdogError {
    /// Create an invalid configuration error.
    #[must_use]
    pub fn invalid_configuration(reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration(reason.into())
    }

    /// Create an invalid activity kind error.
    #[must_use]
    pub fn invalid_activity_kind(name: impl Into<String>) -> Self {
        Self::InvalidActivityKind(name.into())
    }
}

/// A specialized `Result` type for idle watchdog operations.
pub type WatchdogResult<T> = std::result::Result<T, WatchdogError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = WatchdogError::invalid_configuration("grace_timeout_ms must be greater than 0");
        assert_eq!(
            err.to_string(),
            "Invalid configuration: grace_timeout_ms must be greater than 0"
        );

        let err = WatchdogError::invalid_activity_kind("wheel");
        assert!(err.to_string().contains("wheel"));
    }

    #[test]
    fn test_error_constructors() {
        let err = WatchdogError::invalid_configuration("bad");
        assert!(matches!(err, WatchdogError::InvalidConfiguration(_)));

        let err = WatchdogError::invalid_activity_kind("bad");
        assert!(matches!(err, WatchdogError::InvalidActivityKind(_)));
    }
}
