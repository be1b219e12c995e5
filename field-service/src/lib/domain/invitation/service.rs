use std::sync::Arc;

use async_trait::async_trait;
use auth::InvitationToken;
use chrono::Utc;

use crate::domain::authentication::credentials::Credentials;
use crate::domain::identity::context::IdentityContext;
use crate::domain::identity::models::Identity;
use crate::domain::identity::models::NewIdentity;
use crate::domain::identity::ports::IdentityRepository;
use crate::domain::invitation::errors::InvitationError;
use crate::domain::invitation::models::ConsumeInvitationCommand;
use crate::domain::invitation::models::Invitation;
use crate::domain::invitation::models::IssuedInvitation;
use crate::domain::invitation::policy::PasswordPolicy;
use crate::domain::invitation::ports::InvitationRepository;
use crate::domain::invitation::ports::InvitationServicePort;

/// Issues and consumes one-time invitations.
///
/// Callers of [`create_invitation`](Self::create_invitation) and
/// [`reissue`](Self::reissue) must already hold a User/Create authorization.
pub struct InvitationManager<IR, VR>
where
    IR: IdentityRepository,
    VR: InvitationRepository,
{
    identities: Arc<IR>,
    invitations: Arc<VR>,
    credentials: Credentials,
}

impl<IR, VR> InvitationManager<IR, VR>
where
    IR: IdentityRepository,
    VR: InvitationRepository,
{
    pub fn new(identities: Arc<IR>, invitations: Arc<VR>, credentials: Credentials) -> Self {
        Self {
            identities,
            invitations,
            credentials,
        }
    }

    /// Create a login-disabled identity and its first invitation.
    ///
    /// # Arguments
    /// * `ctx` - Issuing identity
    /// * `attributes` - Validated attributes of the new identity
    ///
    /// # Returns
    /// Created identity together with the plaintext token, returned only here
    ///
    /// # Errors
    /// * `Store` - Identity or invitation could not be stored
    /// * `Token` - Randomness unavailable
    pub async fn create_invitation(
        &self,
        ctx: &IdentityContext,
        attributes: NewIdentity,
    ) -> Result<IssuedInvitation, InvitationError> {
        let identity = self
            .identities
            .create(Identity::pending(ctx.service_provider_id(), attributes))
            .await?;

        self.reissue(ctx, identity).await
    }

    /// Issue an additional invitation for an existing identity.
    ///
    /// Earlier invitations are left untouched and remain independently usable
    /// until they expire or are consumed.
    pub async fn reissue(
        &self,
        ctx: &IdentityContext,
        identity: Identity,
    ) -> Result<IssuedInvitation, InvitationError> {
        let token = InvitationToken::generate()?;
        let invitation = self
            .invitations
            .create(Invitation::issue(&identity, &token, ctx.user_id(), Utc::now()))
            .await?;

        tracing::info!(
            invitation_id = %invitation.id,
            user_id = %identity.id,
            issued_by = %ctx.user_id(),
            expires_at = %invitation.expires_at,
            "Invitation issued"
        );

        Ok(IssuedInvitation {
            identity,
            invitation_id: invitation.id,
            token,
            expires_at: invitation.expires_at,
        })
    }
}

#[async_trait]
impl<IR, VR> InvitationServicePort for InvitationManager<IR, VR>
where
    IR: IdentityRepository,
    VR: InvitationRepository,
{
    async fn consume_invitation(
        &self,
        command: ConsumeInvitationCommand,
    ) -> Result<(), InvitationError> {
        if command.token.is_empty() {
            return Err(InvitationError::InvalidOrExpiredToken);
        }

        let invitation = self
            .invitations
            .find_usable_by_token_hash(&command.token.digest(), Utc::now())
            .await?
            .ok_or(InvitationError::InvalidOrExpiredToken)?;

        PasswordPolicy::check(&command.password)?;

        let password_hash = self.credentials.hash(command.password).await?;

        // Re-checks usability under the store's own atomicity; losing a race
        // or crossing the expiry while hashing both land here.
        let consumed = self
            .invitations
            .consume(
                &invitation.id,
                &invitation.identity_id,
                &password_hash,
                Utc::now(),
            )
            .await?;
        if !consumed {
            tracing::info!(invitation_id = %invitation.id, "Invitation already consumed or expired");
            return Err(InvitationError::InvalidOrExpiredToken);
        }

        tracing::info!(
            invitation_id = %invitation.id,
            user_id = %invitation.identity_id,
            "Invitation consumed"
        );

        Ok(())
    }
}
