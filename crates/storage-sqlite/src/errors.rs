//! Storage-level errors and their mapping into the core error type.

use milkline_core::errors::DatabaseError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Query failed: {0}")]
    Query(#[from] diesel::result::Error),

    #[error("Connection pool error: {0}")]
    Pool(#[from] diesel::r2d2::PoolError),

    #[error("{0}")]
    Internal(String),
}

impl From<StorageError> for milkline_core::Error {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Query(e) => Self::Database(DatabaseError::Query(e.to_string())),
            StorageError::Pool(e) => Self::Database(DatabaseError::Pool(e.to_string())),
            StorageError::Internal(message) => Self::Database(DatabaseError::Internal(message)),
        }
    }
}
