use sea_orm::{DbErr, SqlErr};
use thiserror::Error;
use tracing::debug;

/// Error types for the identity module
#[derive(Error, Debug)]
pub enum IdentityError {
    /// Error from the database operations
    #[error("Database error: {0}")]
    Database(DbErr),

    /// A field failed validation before anything was written
    #[error("Invalid {field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    /// A uniqueness constraint rejected the write
    #[error("Conflict: {0}")]
    Conflict(String),

    /// No user with the given id
    #[error("User {0} not found")]
    NotFound(i32),

    /// Error from the password hasher
    #[error("Password hashing error: {0}")]
    PasswordHash(String),
}

impl IdentityError {
    pub(crate) fn validation(field: &'static str, message: impl Into<String>) -> Self {
        IdentityError::Validation {
            field,
            message: message.into(),
        }
    }
}

impl From<DbErr> for IdentityError {
    fn from(error: DbErr) -> Self {
        match error.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(message)) => {
                debug!("Unique constraint violation: {}", message);
                IdentityError::Conflict(message)
            }
            _ => IdentityError::Database(error),
        }
    }
}

/// Type alias for Result with IdentityError
pub type Result<T> = std::result::Result<T, IdentityError>;
