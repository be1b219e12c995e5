use async_trait::async_trait;

use crate::domain::authentication::errors::AuthenticationError;
use crate::domain::authentication::models::LoginCommand;
use crate::domain::authentication::models::Session;

/// Port for credential login.
#[async_trait]
pub trait AuthenticationServicePort: Send + Sync + 'static {
    /// Exchange tenant, email and password for a session token.
    ///
    /// # Errors
    /// * `Validation` - A required field is empty
    /// * `InvalidCredentials` - Unknown identity, pending identity or wrong
    ///   password, indistinguishably
    /// * `AccountDisabled` - Correct password for a deactivated identity
    /// * `Store` - Store operation failed or timed out
    async fn login(&self, command: LoginCommand) -> Result<Session, AuthenticationError>;
}
