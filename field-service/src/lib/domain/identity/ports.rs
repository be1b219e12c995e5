use async_trait::async_trait;

use crate::domain::errors::StoreError;
use crate::domain::identity::context::IdentityContext;
use crate::domain::identity::errors::IdentityError;
use crate::domain::identity::models::CreateUserCommand;
use crate::domain::identity::models::EmailAddress;
use crate::domain::identity::models::Identity;
use crate::domain::identity::models::ProvisionedUser;
use crate::domain::ids::CustomerId;
use crate::domain::ids::IdentityId;
use crate::domain::ids::ServiceProviderId;

/// Port for user provisioning operations.
#[async_trait]
pub trait IdentityServicePort: Send + Sync + 'static {
    /// Create a pending user and send it an invitation.
    ///
    /// # Arguments
    /// * `ctx` - Caller identity
    /// * `command` - Requested role, customer and descriptive attributes
    ///
    /// # Returns
    /// Created identity and whether the invitation reached the delivery channel
    ///
    /// # Errors
    /// * `Authorization` - Caller may not create this role, or the
    ///   role/customer combination is invalid
    /// * `Validation` - Customer does not belong to the caller's provider
    /// * `EmailAlreadyExists` - Email already registered for this provider
    /// * `Store` - Store operation failed
    async fn create_user(
        &self,
        ctx: &IdentityContext,
        command: CreateUserCommand,
    ) -> Result<ProvisionedUser, IdentityError>;

    /// Issue an additional invitation to a pending user.
    ///
    /// # Errors
    /// * `NotFound` - No such identity in the caller's provider
    /// * `Conflict` - Identity already has a password
    /// * `Authorization` - Caller may not manage the identity's role
    async fn reinvite(
        &self,
        ctx: &IdentityContext,
        identity_id: &IdentityId,
    ) -> Result<ProvisionedUser, IdentityError>;

    /// Activate or deactivate a user.
    ///
    /// # Errors
    /// * `NotFound` - No such identity in the caller's provider
    /// * `Authorization` - Caller may not manage the identity's role
    /// * `Validation` - Caller attempted to deactivate themselves
    async fn set_active(
        &self,
        ctx: &IdentityContext,
        identity_id: &IdentityId,
        active: bool,
    ) -> Result<Identity, IdentityError>;
}

/// Persistence operations for identities.
#[async_trait]
pub trait IdentityRepository: Send + Sync + 'static {
    /// Find an identity by tenant and normalized email.
    ///
    /// # Returns
    /// Optional identity (None if not found)
    ///
    /// # Errors
    /// * `StoreError` - Store operation failed or timed out
    async fn find_by_tenant_and_email(
        &self,
        service_provider_id: &ServiceProviderId,
        email: &EmailAddress,
    ) -> Result<Option<Identity>, StoreError>;

    /// Find an identity by identifier.
    ///
    /// # Errors
    /// * `StoreError` - Store operation failed or timed out
    async fn find_by_id(&self, id: &IdentityId) -> Result<Option<Identity>, StoreError>;

    /// Persist a new identity.
    ///
    /// # Errors
    /// * `UniqueViolation` - Email already registered for the provider
    /// * `StoreError` - Store operation failed or timed out
    async fn create(&self, identity: Identity) -> Result<Identity, StoreError>;

    /// Replace the stored password hash.
    ///
    /// # Returns
    /// True if the identity existed
    async fn update_password(
        &self,
        id: &IdentityId,
        password_hash: &str,
    ) -> Result<bool, StoreError>;

    /// Set the active flag of an identity within a provider.
    ///
    /// # Returns
    /// Updated identity, or None if it does not exist in that provider
    async fn set_active(
        &self,
        service_provider_id: &ServiceProviderId,
        id: &IdentityId,
        active: bool,
    ) -> Result<Option<Identity>, StoreError>;

    /// Whether the customer belongs to the service provider.
    async fn customer_in_provider(
        &self,
        service_provider_id: &ServiceProviderId,
        customer_id: &CustomerId,
    ) -> Result<bool, StoreError>;
}
