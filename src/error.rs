//! Error types for chatstore

use thiserror::Error;

/// The main error type for chatstore operations
#[derive(Error, Debug)]
pub enum Error {
    /// Referenced session does not exist
    #[error("Session not found: {0}")]
    NotFound(String),

    /// Feedback target index is negative or past the end of history
    #[error("Message index out of range: {0}")]
    IndexOutOfRange(i64),

    /// Snapshot read/write failed; in-memory state stays valid
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Caller-level input issues (empty question, bad feedback value);
    /// produced by the transport layer, never by the store itself
    #[error("Validation error: {0}")]
    Validation(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// A specialized Result type for chatstore operations
pub type Result<T> = std::result::Result<T, Error>;

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
