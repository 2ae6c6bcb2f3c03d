//! Error types for database gateway operations.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for gateway operations.
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Result type for driver calls.
pub type BackendResult<T> = Result<T, BackendError>;

/// A failure reported by the database driver.
///
/// The message is the driver's own text and is surfaced to the client
/// unchanged (duplicate table names, invalid types, and so on).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct BackendError {
    /// Driver-supplied description of the failure.
    pub message: String,
}

impl BackendError {
    /// Creates a backend error from any displayable message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<rusqlite::Error> for BackendError {
    fn from(err: rusqlite::Error) -> Self {
        Self::new(err.to_string())
    }
}

/// Errors that can occur during gateway operations.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The database file does not exist.
    #[error("Database file not found: {}", path.display())]
    NotFound {
        /// Path that was requested.
        path: PathBuf,
    },

    /// The driver could not open the database file.
    #[error("Failed to open database: {message}")]
    ConnectionError {
        /// Driver-supplied reason.
        message: String,
    },

    /// An operation that needs a connection was called while disconnected.
    #[error("Not connected to database")]
    NotConnected,

    /// The driver rejected a query or statement.
    #[error("{0}")]
    BackendError(#[from] BackendError),

    /// The requested path is outside the configured allowed directories.
    #[error("Access denied: path is outside the configured allowed directories")]
    AccessDenied,

    /// An argument failed gateway-level validation.
    #[error("{message}")]
    InvalidArgument {
        /// Description of what's wrong.
        message: String,
    },

    /// The host automation layer failed.
    #[error("Automation error: {message}")]
    Automation {
        /// Description of what went wrong.
        message: String,
    },
}

impl GatewayError {
    /// Creates an invalid argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }
}
