use std::sync::Arc;

use async_trait::async_trait;
use auth::SessionClaims;

use crate::domain::authentication::credentials::Credentials;
use crate::domain::authentication::errors::AuthenticationError;
use crate::domain::authentication::models::LoginCommand;
use crate::domain::authentication::models::Session;
use crate::domain::authentication::ports::AuthenticationServicePort;
use crate::domain::identity::models::EmailAddress;
use crate::domain::identity::ports::IdentityRepository;
use crate::domain::ids::ServiceProviderId;

/// Domain service for credential login.
pub struct AuthenticationService<IR>
where
    IR: IdentityRepository,
{
    repository: Arc<IR>,
    credentials: Credentials,
}

impl<IR> AuthenticationService<IR>
where
    IR: IdentityRepository,
{
    /// Create a new authentication service.
    ///
    /// # Arguments
    /// * `repository` - Identity persistence implementation
    /// * `credentials` - Password work runner and token signer
    pub fn new(repository: Arc<IR>, credentials: Credentials) -> Self {
        Self {
            repository,
            credentials,
        }
    }
}

#[async_trait]
impl<IR> AuthenticationServicePort for AuthenticationService<IR>
where
    IR: IdentityRepository,
{
    async fn login(&self, command: LoginCommand) -> Result<Session, AuthenticationError> {
        let provider = command.service_provider_id.trim();
        let email = command.email.trim();
        if provider.is_empty() || email.is_empty() || command.password.is_empty() {
            return Err(AuthenticationError::Validation(
                "service_provider_id, email and password are required".to_string(),
            ));
        }

        // Unparseable input behaves exactly like an unknown account.
        let identity = match (
            ServiceProviderId::from_string(provider),
            EmailAddress::new(email),
        ) {
            (Ok(provider_id), Ok(email)) => {
                self.repository
                    .find_by_tenant_and_email(&provider_id, &email)
                    .await?
            }
            _ => None,
        };

        let stored_hash = identity
            .as_ref()
            .and_then(|i| i.password.as_hash())
            .map(str::to_string);
        let verified = self
            .credentials
            .verify(command.password, stored_hash)
            .await?;

        let identity = match identity {
            Some(identity) if verified => identity,
            _ => {
                tracing::info!(service_provider_id = %provider, "Login rejected");
                return Err(AuthenticationError::InvalidCredentials);
            }
        };

        if !identity.active {
            tracing::info!(user_id = %identity.id, "Login rejected for disabled account");
            return Err(AuthenticationError::AccountDisabled);
        }

        let claims = SessionClaims::for_identity(
            identity.id,
            identity.service_provider_id,
            identity.role.as_str(),
        )
        .with_customer(identity.customer_id);
        let access_token = self.credentials.authenticator().generate_token(&claims)?;

        tracing::info!(
            user_id = %identity.id,
            service_provider_id = %identity.service_provider_id,
            role = %identity.role,
            "Login succeeded"
        );

        Ok(Session {
            access_token,
            identity,
        })
    }
}
