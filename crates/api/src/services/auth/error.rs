//! Authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;
use crate::error::FieldErrors;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Field-level validation failure on registration input.
    #[error("validation failed: {0}")]
    Validation(FieldErrors),

    /// Invalid credentials (wrong password or unknown username).
    ///
    /// Deliberately uniform so login responses don't reveal which part was
    /// wrong.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Bearer token missing, malformed, expired, or of the wrong kind.
    #[error("invalid token")]
    InvalidToken,

    /// Registration lost a uniqueness race or hit a duplicate; the whole
    /// multi-step operation was rolled back.
    #[error("registration conflict: {0}")]
    RegistrationConflict(String),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,

    /// Token signing error.
    #[error("token encoding error: {0}")]
    TokenEncoding(#[from] jsonwebtoken::errors::Error),
}
