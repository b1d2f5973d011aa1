//! Error types for database operations

use thiserror::Error;

/// Database error types
#[derive(Error, Debug)]
pub enum Error {
    /// SQLx database error
    #[error("Database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// Migration error
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A stored value could not be decoded
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

impl Error {
    /// Whether this is a UNIQUE or PRIMARY KEY constraint violation
    pub fn is_unique_violation(&self) -> bool {
        match self {
            Error::Sqlx(sqlx::Error::Database(db)) => db.is_unique_violation(),
            _ => false,
        }
    }
}

impl From<Error> for roster_core::Error {
    fn from(err: Error) -> Self {
        roster_core::Error::Storage(err.to_string())
    }
}

/// Result type alias for database operations
pub type Result<T> = std::result::Result<T, Error>;
