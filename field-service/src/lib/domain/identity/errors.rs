use thiserror::Error;

use crate::domain::authorization::errors::AuthorizationError;
use crate::domain::errors::StoreError;
use crate::domain::invitation::errors::InvitationError;

/// Error for Role parsing failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RoleError {
    #[error("Unknown role: {0}")]
    Unknown(String),
}

/// Error for EmailAddress validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EmailError {
    #[error("Email is required")]
    Empty,

    #[error("Invalid email format: {0}")]
    InvalidFormat(String),
}

/// Error for FullName validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FullNameError {
    #[error("Full name is required")]
    Empty,

    #[error("Full name too long: maximum {max} characters, got {actual}")]
    TooLong { max: usize, actual: usize },
}

/// Claims that verified cryptographically but do not describe a valid identity
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ClaimsError {
    #[error("Malformed claim {claim}: {reason}")]
    Malformed { claim: &'static str, reason: String },

    #[error("Customer claim does not match role {0}")]
    CustomerMismatch(String),
}

/// Top-level error for user provisioning operations
#[derive(Debug, Clone, Error)]
pub enum IdentityError {
    #[error("Invalid role: {0}")]
    InvalidRole(#[from] RoleError),

    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    #[error("Invalid full name: {0}")]
    InvalidFullName(#[from] FullNameError),

    #[error("{0}")]
    Authorization(#[from] AuthorizationError),

    #[error("{0}")]
    Validation(String),

    #[error("User not found: {0}")]
    NotFound(String),

    #[error("Email already exists: {0}")]
    EmailAlreadyExists(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Invitation error: {0}")]
    Invitation(#[from] InvitationError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}
