use thiserror::Error;

use crate::domain::authorization::errors::AuthorizationError;
use crate::domain::errors::StoreError;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PeriodError {
    #[error("month is required (YYYY-MM)")]
    Missing,

    #[error("invalid month format, expected YYYY-MM")]
    InvalidFormat,
}

#[derive(Debug, Clone, Error)]
pub enum ReportError {
    #[error("{0}")]
    Authorization(#[from] AuthorizationError),

    #[error("{0}")]
    InvalidPeriod(#[from] PeriodError),

    #[error("Provider/customer not found: {0}")]
    NotFound(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}
