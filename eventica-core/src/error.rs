//! Error types for Eventica.

use thiserror::Error;

/// Errors that can occur in Eventica operations.
#[derive(Error, Debug)]
pub enum EventicaError {
    #[error("{0}")]
    Validation(String),

    #[error("Invalid date: {0}")]
    MalformedDate(String),

    #[error("Event not found: {0}")]
    NotFound(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Storage error: {0}")]
    Persistence(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<rusqlite::Error> for EventicaError {
    fn from(err: rusqlite::Error) -> Self {
        EventicaError::Persistence(err.to_string())
    }
}

/// Result type alias for Eventica operations.
pub type EventicaResult<T> = Result<T, EventicaError>;
