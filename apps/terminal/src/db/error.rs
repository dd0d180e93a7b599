//! Database error types.

use drill_core::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("cannot create database directory: {0}")]
    Io(#[from] std::io::Error),

    #[error("database lock poisoned")]
    Poisoned,
}

impl From<DbError> for StoreError {
    fn from(e: DbError) -> Self {
        match e {
            DbError::Poisoned => StoreError::Poisoned,
            other => StoreError::Unavailable(other.to_string()),
        }
    }
}
