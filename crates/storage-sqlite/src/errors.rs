//! Conversion of SQLite errors into the core's storage-agnostic types.

use thiserror::Error;
use tradepulse_core::errors::{Error as CoreError, StoreError};

/// Storage-layer error wrapper.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Invalid stored value: {0}")]
    InvalidValue(String),
}

impl From<StorageError> for CoreError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Sqlite(rusqlite::Error::QueryReturnedNoRows) => {
                CoreError::Store(StoreError::NotFound("no rows returned".to_string()))
            }
            StorageError::Sqlite(e) => CoreError::Store(StoreError::QueryFailed(e.to_string())),
            StorageError::Serde(e) => CoreError::Store(StoreError::Serialization(e.to_string())),
            StorageError::InvalidValue(msg) => CoreError::Store(StoreError::Serialization(msg)),
        }
    }
}
