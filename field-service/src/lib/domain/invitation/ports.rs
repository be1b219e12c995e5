use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;

use crate::domain::errors::StoreError;
use crate::domain::ids::IdentityId;
use crate::domain::ids::InvitationId;
use crate::domain::invitation::errors::DeliveryError;
use crate::domain::invitation::errors::InvitationError;
use crate::domain::invitation::models::ConsumeInvitationCommand;
use crate::domain::invitation::models::Invitation;
use crate::domain::invitation::models::InvitationNotice;

/// Port for invitation consumption.
#[async_trait]
pub trait InvitationServicePort: Send + Sync + 'static {
    /// Set the invitee's password by presenting the one-time token.
    ///
    /// # Errors
    /// * `InvalidOrExpiredToken` - Token unknown, already used or expired
    /// * `WeakPassword` - Password fails the policy
    /// * `Store` - Store operation failed or timed out
    async fn consume_invitation(
        &self,
        command: ConsumeInvitationCommand,
    ) -> Result<(), InvitationError>;
}

/// Persistence operations for invitations.
#[async_trait]
pub trait InvitationRepository: Send + Sync + 'static {
    /// Persist a new invitation.
    async fn create(&self, invitation: Invitation) -> Result<Invitation, StoreError>;

    /// Find an invitation that is unconsumed and unexpired at `now`.
    async fn find_usable_by_token_hash(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Invitation>, StoreError>;

    /// Atomically mark the invitation consumed and set the identity's password.
    ///
    /// Applies only while the invitation is still unconsumed and unexpired at
    /// `now`; otherwise nothing changes.
    ///
    /// # Returns
    /// True if this call consumed the invitation
    async fn consume(
        &self,
        invitation_id: &InvitationId,
        identity_id: &IdentityId,
        password_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<bool, StoreError>;
}

/// Out-of-band channel that hands the plaintext token to the invitee.
#[async_trait]
pub trait InvitationDelivery: Send + Sync + 'static {
    async fn deliver(&self, notice: &InvitationNotice) -> Result<(), DeliveryError>;
}
