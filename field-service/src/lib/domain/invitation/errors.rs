use auth::InvitationTokenError;
use thiserror::Error;

use crate::domain::authentication::errors::CredentialError;
use crate::domain::errors::StoreError;

/// Reason a new password was refused
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WeakPasswordError {
    #[error("password must be at least {min} characters")]
    TooShort { min: usize },

    #[error("password must be at most {max} characters")]
    TooLong { max: usize },

    #[error("password must not be blank")]
    Blank,

    #[error("password must contain at least one letter")]
    MissingLetter,

    #[error("password must contain at least one digit")]
    MissingDigit,
}

/// Top-level error for invitation operations
#[derive(Debug, Clone, Error)]
pub enum InvitationError {
    #[error("Invalid or expired token")]
    InvalidOrExpiredToken,

    #[error("Weak password: {0}")]
    WeakPassword(#[from] WeakPasswordError),

    #[error("Token generation failed: {0}")]
    Token(#[from] InvitationTokenError),

    #[error("Credential error: {0}")]
    Credential(#[from] CredentialError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Error for handing an invitation to the delivery channel
#[derive(Debug, Clone, Error)]
pub enum DeliveryError {
    #[error("Delivery rejected: {0}")]
    Rejected(String),

    #[error("Delivery timed out")]
    Timeout,

    #[error("Delivery failed: {0}")]
    Transport(String),
}
