// Central Error Type for the Queue

use crate::config::BackendKind;
use crate::port::StorageOp;
use thiserror::Error;

/// Application-level error type
#[derive(Error, Debug)]
pub enum AppError {
    /// A persistent backend was requested without a required connection parameter
    #[error("Missing configuration: {{{field}}} is required for a persistent backend")]
    MissingConfiguration { field: &'static str },

    #[error("Configuration error: {0}")]
    Config(String),

    /// The adapter handed out by a factory does not serve the requested backend
    #[error("Invalid storage adapter: expected {expected}, got {actual}")]
    InvalidAdapter {
        expected: BackendKind,
        actual: BackendKind,
    },

    #[error("Storage {op} failed: {message}")]
    Storage { op: StorageOp, message: String },

    #[error("Malformed envelope: {0}")]
    MalformedEnvelope(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Shorthand for a storage failure of the given operation
    pub fn storage(op: StorageOp, message: impl Into<String>) -> Self {
        AppError::Storage {
            op,
            message: message.into(),
        }
    }
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;

// Note: sqlx::Error conversion is handled in infra-sqlite crate
// by converting to AppError::Storage
