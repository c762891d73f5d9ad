//! Storage error types for the durable diagram log.

use thiserror::Error;

/// Storage operation errors.
#[derive(Error, Debug, Clone)]
pub enum StorageError {
    /// Database could not be opened or initialized
    #[error("Connection error: {0}")]
    ConnectionError(String),
    /// A statement failed
    #[error("Query error: {0}")]
    QueryError(String),
    /// General storage error
    #[error("Storage error: {0}")]
    Other(String),
}

impl From<rusqlite::Error> for StorageError {
    fn from(e: rusqlite::Error) -> Self {
        StorageError::QueryError(e.to_string())
    }
}
