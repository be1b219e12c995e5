use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::authorization::models::AccessRequest;
use crate::domain::authorization::models::Operation;
use crate::domain::authorization::models::Resource;
use crate::domain::authorization::AuthorizationEngine;
use crate::domain::errors::StoreError;
use crate::domain::identity::context::IdentityContext;
use crate::domain::identity::errors::IdentityError;
use crate::domain::identity::models::CreateUserCommand;
use crate::domain::identity::models::Identity;
use crate::domain::identity::models::ProvisionedUser;
use crate::domain::identity::ports::IdentityRepository;
use crate::domain::identity::ports::IdentityServicePort;
use crate::domain::ids::IdentityId;
use crate::domain::invitation::errors::InvitationError;
use crate::domain::invitation::models::InvitationNotice;
use crate::domain::invitation::models::IssuedInvitation;
use crate::domain::invitation::ports::InvitationDelivery;
use crate::domain::invitation::ports::InvitationRepository;
use crate::domain::invitation::InvitationManager;

/// Domain service for provisioning and managing user accounts.
pub struct IdentityService<IR, VR, D>
where
    IR: IdentityRepository,
    VR: InvitationRepository,
    D: InvitationDelivery + ?Sized,
{
    repository: Arc<IR>,
    invitations: Arc<InvitationManager<IR, VR>>,
    delivery: Arc<D>,
    engine: AuthorizationEngine,
}

impl<IR, VR, D> IdentityService<IR, VR, D>
where
    IR: IdentityRepository,
    VR: InvitationRepository,
    D: InvitationDelivery + ?Sized,
{
    /// Create a new identity service.
    ///
    /// # Arguments
    /// * `repository` - Identity persistence implementation
    /// * `invitations` - Invitation lifecycle manager
    /// * `delivery` - Channel that hands tokens to invitees
    pub fn new(
        repository: Arc<IR>,
        invitations: Arc<InvitationManager<IR, VR>>,
        delivery: Arc<D>,
    ) -> Self {
        Self {
            repository,
            invitations,
            delivery,
            engine: AuthorizationEngine::new(),
        }
    }

    /// Load an identity that belongs to the caller's provider.
    async fn find_in_tenant(
        &self,
        ctx: &IdentityContext,
        id: &IdentityId,
    ) -> Result<Identity, IdentityError> {
        self.repository
            .find_by_id(id)
            .await?
            .filter(|identity| identity.service_provider_id == ctx.service_provider_id())
            .ok_or_else(|| IdentityError::NotFound(id.to_string()))
    }

    fn authorize_management(
        &self,
        ctx: &IdentityContext,
        operation: Operation,
        target: &Identity,
    ) -> Result<(), IdentityError> {
        let request = AccessRequest::new(Resource::User, operation)
            .for_role(target.role)
            .for_customer(target.customer_id);
        self.engine.authorize(ctx, &request)?;
        Ok(())
    }

    /// Hand the token to the delivery channel, reporting whether it was accepted.
    async fn deliver(&self, issued: &IssuedInvitation) -> bool {
        let notice = InvitationNotice::from(issued);
        match self.delivery.deliver(&notice).await {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(
                    invitation_id = %issued.invitation_id,
                    user_id = %issued.identity.id,
                    error = %e,
                    "Failed to deliver invitation"
                );
                false
            }
        }
    }

    fn provisioned(issued: IssuedInvitation, invite_sent: bool) -> ProvisionedUser {
        ProvisionedUser {
            invitation_expires_at: issued.expires_at,
            identity: issued.identity,
            invite_sent,
        }
    }
}

#[async_trait]
impl<IR, VR, D> IdentityServicePort for IdentityService<IR, VR, D>
where
    IR: IdentityRepository,
    VR: InvitationRepository,
    D: InvitationDelivery + ?Sized,
{
    async fn create_user(
        &self,
        ctx: &IdentityContext,
        command: CreateUserCommand,
    ) -> Result<ProvisionedUser, IdentityError> {
        let request = AccessRequest::new(Resource::User, Operation::Create)
            .for_role(command.role)
            .for_customer(command.customer_id);
        self.engine.authorize(ctx, &request)?;

        let attributes = command.validate()?;

        if let Some(customer_id) = &attributes.customer_id {
            let owned = self
                .repository
                .customer_in_provider(&ctx.service_provider_id(), customer_id)
                .await?;
            if !owned {
                return Err(IdentityError::Validation(
                    "invalid customer_id for this provider".to_string(),
                ));
            }
        }

        if self
            .repository
            .find_by_tenant_and_email(&ctx.service_provider_id(), &attributes.email)
            .await?
            .is_some()
        {
            return Err(IdentityError::EmailAlreadyExists(
                attributes.email.to_string(),
            ));
        }

        let email = attributes.email.to_string();
        let issued = self
            .invitations
            .create_invitation(ctx, attributes)
            .await
            .map_err(|e| match e {
                InvitationError::Store(StoreError::UniqueViolation(_)) => {
                    IdentityError::EmailAlreadyExists(email)
                }
                other => IdentityError::from(other),
            })?;

        tracing::info!(
            user_id = %issued.identity.id,
            role = %issued.identity.role,
            created_by = %ctx.user_id(),
            "User created"
        );

        let invite_sent = self.deliver(&issued).await;
        Ok(Self::provisioned(issued, invite_sent))
    }

    async fn reinvite(
        &self,
        ctx: &IdentityContext,
        identity_id: &IdentityId,
    ) -> Result<ProvisionedUser, IdentityError> {
        let target = self.find_in_tenant(ctx, identity_id).await?;
        self.authorize_management(ctx, Operation::Create, &target)?;

        if !target.is_pending() {
            return Err(IdentityError::Conflict(
                "user has already set a password".to_string(),
            ));
        }

        let issued = self.invitations.reissue(ctx, target).await?;
        let invite_sent = self.deliver(&issued).await;
        Ok(Self::provisioned(issued, invite_sent))
    }

    async fn set_active(
        &self,
        ctx: &IdentityContext,
        identity_id: &IdentityId,
        active: bool,
    ) -> Result<Identity, IdentityError> {
        let target = self.find_in_tenant(ctx, identity_id).await?;
        self.authorize_management(ctx, Operation::SetActive, &target)?;

        if !active && target.id == ctx.user_id() {
            return Err(IdentityError::Validation(
                "cannot deactivate your own account".to_string(),
            ));
        }

        let updated = self
            .repository
            .set_active(&ctx.service_provider_id(), identity_id, active)
            .await?
            .ok_or_else(|| IdentityError::NotFound(identity_id.to_string()))?;

        tracing::info!(
            user_id = %updated.id,
            active = updated.active,
            changed_by = %ctx.user_id(),
            "User activation changed"
        );

        Ok(updated)
    }
}
