use auth::JwtError;
use thiserror::Error;

use crate::domain::errors::StoreError;

/// Error for password work handed to the blocking pool
#[derive(Debug, Clone, Error)]
pub enum CredentialError {
    #[error("Password hashing failed: {0}")]
    Hashing(String),

    #[error("Credential worker failed: {0}")]
    Worker(String),
}

/// Top-level error for login
#[derive(Debug, Clone, Error)]
pub enum AuthenticationError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Account disabled")]
    AccountDisabled,

    #[error("{0}")]
    Validation(String),

    #[error("Credential error: {0}")]
    Credential(#[from] CredentialError),

    #[error("Token error: {0}")]
    Token(#[from] JwtError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}
