use thiserror::Error;

/// Error type for invitation token operations.
#[derive(Debug, Clone, Error)]
pub enum InvitationTokenError {
    #[error("Randomness unavailable: {0}")]
    RandomnessUnavailable(String),
}
