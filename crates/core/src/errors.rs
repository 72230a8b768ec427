//! Error types shared across the milkline crates.

use thiserror::Error;

/// Result type alias used throughout the core and adapter crates.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error for core services.
#[derive(Debug, Error)]
pub enum Error {
    /// Local durable store failure.
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Remote data service failure (already stringified by the transport crate).
    #[error("Remote service error: {0}")]
    Remote(String),

    /// Caller supplied invalid input.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A referenced entity does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// No authenticated identity, or the identity is not allowed here.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// App-local file storage failure (staged photos).
    #[error("File storage error: {0}")]
    FileStorage(String),

    /// JSON serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Local store faults, kept separate so callers can tell data corruption
/// apart from transient remote failures.
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("{0}")]
    Internal(String),

    #[error("Connection pool error: {0}")]
    Pool(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Migration failed: {0}")]
    Migration(String),
}

impl Error {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn remote(message: impl Into<String>) -> Self {
        Self::Remote(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized(message.into())
    }

    pub fn file_storage(message: impl Into<String>) -> Self {
        Self::FileStorage(message.into())
    }
}
