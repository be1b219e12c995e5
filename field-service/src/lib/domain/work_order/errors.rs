use thiserror::Error;

use crate::domain::authorization::errors::AuthorizationError;
use crate::domain::errors::StoreError;

/// Error for enumerated field parsing failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Invalid {field}: {value}")]
pub struct UnknownValueError {
    pub field: &'static str,
    pub value: String,
}

/// Top-level error for work order operations
#[derive(Debug, Clone, Error)]
pub enum WorkOrderError {
    #[error("{0}")]
    Authorization(#[from] AuthorizationError),

    #[error("{0}")]
    InvalidValue(#[from] UnknownValueError),

    #[error("{0}")]
    Validation(String),

    #[error("Work order not found: {0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}
