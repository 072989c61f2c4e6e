//! Failures from login, registration and token checks.

use thiserror::Error;

use crate::db::RepositoryError;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("malformed email: {0}")]
    InvalidEmail(#[from] souq_core::EmailError),

    /// Wrong password and unknown email are reported the same way.
    #[error("email or password did not match")]
    InvalidCredentials,

    #[error("email is already registered")]
    UserAlreadyExists,

    /// Carries the client-facing reason.
    #[error("{0}")]
    WeakPassword(String),

    #[error("name is required")]
    MissingName,

    /// Bearer token missing, malformed, tampered with or expired.
    #[error("rejected token: {0}")]
    InvalidToken(String),

    #[error("could not sign token: {0}")]
    TokenSigning(String),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// Argon2 failed to hash or parse a stored hash.
    #[error("argon2 failure")]
    PasswordHash,
}
