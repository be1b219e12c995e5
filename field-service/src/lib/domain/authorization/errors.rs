use thiserror::Error;

/// Outcome of a rejected access request
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthorizationError {
    #[error("Operation not permitted")]
    Denied,

    #[error("{0}")]
    Validation(String),
}
