//! Core error types for the TradePulse sync engine.
//!
//! This module defines storage-agnostic error types. Storage-specific errors
//! (from SQLite, etc.) are converted to these types by the storage layer.

use thiserror::Error;
use tradepulse_trading_api::ApiError;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the sync engine.
///
/// Storage-specific errors are wrapped in string form to keep this type
/// storage-agnostic.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Store operation failed: {0}")]
    Store(#[from] StoreError),

    #[error("Trading API request failed: {0}")]
    Api(#[from] ApiError),

    #[error("Realtime channel error: {0}")]
    Channel(String),

    #[error("Input validation failed: {0}")]
    Validation(String),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl Error {
    /// Whether the failure is transient: the operation may succeed on a later
    /// trigger and existing local state remains usable in the meantime.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Error::Api(e) => e.is_recoverable(),
            Error::Channel(_) => true,
            Error::Store(_) | Error::Validation(_) | Error::Unexpected(_) => false,
        }
    }
}

/// Storage-agnostic error type for repository operations.
///
/// This enum uses `String` for all error details, allowing the storage layer
/// to convert storage-specific errors into this format.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Failed to open or configure the backing store.
    #[error("Failed to open store: {0}")]
    OpenFailed(String),

    /// A query against the store failed to execute.
    #[error("Store query failed: {0}")]
    QueryFailed(String),

    /// The requested record was not found.
    #[error("Record not found: {0}")]
    NotFound(String),

    /// A stored value could not be encoded or decoded.
    #[error("Serialization failed: {0}")]
    Serialization(String),

    /// Internal/unexpected store error.
    #[error("Internal store error: {0}")]
    Internal(String),
}

// === From implementations for common error types ===

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Store(StoreError::Serialization(err.to_string()))
    }
}

impl From<Error> for String {
    fn from(err: Error) -> Self {
        err.to_string()
    }
}
