//! Error types for userdir

use std::time::Duration;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, UserDirError>;

#[derive(Error, Debug)]
pub enum UserDirError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Cache error: {0}")]
    Cache(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("{operation} timed out after {timeout:?}")]
    Timeout {
        operation: &'static str,
        timeout: Duration,
    },
}

impl UserDirError {
    /// Whether the error came from the record store (including store timeouts)
    pub fn is_store_failure(&self) -> bool {
        match self {
            UserDirError::Database(_) => true,
            UserDirError::Timeout { operation, .. } => operation.starts_with("store"),
            _ => false,
        }
    }
}

impl From<serde_json::Error> for UserDirError {
    fn from(e: serde_json::Error) -> Self {
        UserDirError::Serialization(e.to_string())
    }
}
