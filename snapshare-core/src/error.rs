//! Error types for snapshare.

use thiserror::Error;

/// Errors that can occur in snapshare operations.
#[derive(Error, Debug)]
pub enum SnapError {
    #[error("Event not found: {0}")]
    NotFound(String),

    #[error("Malformed record under '{key}': {reason}")]
    Malformed { key: String, reason: String },

    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl SnapError {
    /// True for errors a caller can recover from by treating the event as absent.
    pub fn is_not_found(&self) -> bool {
        matches!(self, SnapError::NotFound(_) | SnapError::Malformed { .. })
    }
}

/// Result type alias for snapshare operations.
pub type SnapResult<T> = Result<T, SnapError>;
