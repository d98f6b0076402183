//! Error handling module for the client timer
//!
//! Provides centralized error handling with proper error types using thiserror.
//! Validation failures are raised before any side effect; collaborator failures
//! (filesystem, systemd) are surfaced verbatim so callers can retry.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for unit generation and reconciliation
#[derive(Error, Debug)]
pub enum TimerError {
    /// IO errors outside a unit request
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Rejected job input; nothing has been touched yet
    #[error("Validation error: {0}")]
    Validation(String),

    /// The log directory could not be provisioned
    #[error("Failed to create directory {}: {source}", path.display())]
    DirectoryCreation {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The unit manager has no unit with this name
    #[error("Unit not found: {0}")]
    UnitNotFound(String),

    /// A create/enable/start/remove request against the unit manager failed
    #[error("Failed to {action} unit {unit}: {message}")]
    UnitMutation {
        unit: String,
        action: String,
        message: String,
    },

    /// State errors (mutex poisoning)
    #[error("State error: {0}")]
    State(String),
}

/// Result type alias for client timer operations
pub type Result<T> = std::result::Result<T, TimerError>;

impl TimerError {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a unit mutation error
    pub fn unit_mutation(
        unit: impl Into<String>,
        action: impl ToString,
        message: impl Into<String>,
    ) -> Self {
        Self::UnitMutation {
            unit: unit.into(),
            action: action.to_string(),
            message: message.into(),
        }
    }

    /// Create a state error
    pub fn state(msg: impl Into<String>) -> Self {
        Self::State(msg.into())
    }

    /// True for errors rejected before any I/O happened
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TimerError::validation("splay must be a positive number");
        assert_eq!(
            err.to_string(),
            "Validation error: splay must be a positive number"
        );

        let err = TimerError::unit_mutation("nightly.timer", "enable", "permission denied");
        assert_eq!(
            err.to_string(),
            "Failed to enable unit nightly.timer: permission denied"
        );
    }

    #[test]
    fn test_directory_creation_display() {
        let err = TimerError::DirectoryCreation {
            path: PathBuf::from("/var/log/chef"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(
            err.to_string(),
            "Failed to create directory /var/log/chef: denied"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: TimerError = io_err.into();
        assert!(matches!(err, TimerError::Io(_)));
        assert!(!err.is_validation());
    }
}
