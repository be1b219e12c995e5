use thiserror::Error;

/// Error for identifier parsing failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IdError {
    #[error("Invalid UUID format: {0}")]
    InvalidFormat(String),
}

/// Error raised by any store adapter.
///
/// Timeouts and unavailability are infrastructure conditions and must never be
/// turned into an authorization or authentication outcome.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("Store operation timed out")]
    Timeout,

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Unique constraint violated: {0}")]
    UniqueViolation(String),

    #[error("Stored record is corrupt: {0}")]
    Corrupt(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl StoreError {
    /// Whether an idempotent read may be attempted again.
    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::Timeout | StoreError::Unavailable(_))
    }
}
