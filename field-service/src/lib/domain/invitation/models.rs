use std::fmt;

use auth::InvitationToken;
use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;

use crate::domain::identity::models::Identity;
use crate::domain::identity::models::Role;
use crate::domain::ids::IdentityId;
use crate::domain::ids::InvitationId;
use crate::domain::ids::ServiceProviderId;

/// How long an invitation stays usable after issue.
pub const INVITATION_TTL_HOURS: i64 = 48;

/// Stored invitation record.
///
/// Holds only the SHA-256 digest of the plaintext token. Usable while
/// `consumed_at` is empty and the expiry is in the future.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invitation {
    pub id: InvitationId,
    pub service_provider_id: ServiceProviderId,
    pub identity_id: IdentityId,
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
    pub consumed_at: Option<DateTime<Utc>>,
    pub created_by: IdentityId,
    pub created_at: DateTime<Utc>,
}

impl Invitation {
    /// Build a fresh invitation for `identity`, expiring after the standard window.
    pub fn issue(
        identity: &Identity,
        token: &InvitationToken,
        created_by: IdentityId,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: InvitationId::new(),
            service_provider_id: identity.service_provider_id,
            identity_id: identity.id,
            token_hash: token.digest(),
            expires_at: now + Duration::hours(INVITATION_TTL_HOURS),
            consumed_at: None,
            created_by,
            created_at: now,
        }
    }

    pub fn is_usable_at(&self, now: DateTime<Utc>) -> bool {
        self.consumed_at.is_none() && now < self.expires_at
    }
}

/// Invitation returned to the issuer, carrying the only copy of the plaintext.
#[derive(Debug, Clone)]
pub struct IssuedInvitation {
    pub identity: Identity,
    pub invitation_id: InvitationId,
    pub token: InvitationToken,
    pub expires_at: DateTime<Utc>,
}

/// Everything the delivery channel needs to reach the invitee.
#[derive(Debug, Clone)]
pub struct InvitationNotice {
    pub invitation_id: InvitationId,
    pub identity_id: IdentityId,
    pub service_provider_id: ServiceProviderId,
    pub email: String,
    pub full_name: String,
    pub role: Role,
    pub token: InvitationToken,
    pub expires_at: DateTime<Utc>,
}

impl From<&IssuedInvitation> for InvitationNotice {
    fn from(issued: &IssuedInvitation) -> Self {
        Self {
            invitation_id: issued.invitation_id,
            identity_id: issued.identity.id,
            service_provider_id: issued.identity.service_provider_id,
            email: issued.identity.email.as_str().to_string(),
            full_name: issued.identity.full_name.as_str().to_string(),
            role: issued.identity.role,
            token: issued.token.clone(),
            expires_at: issued.expires_at,
        }
    }
}

/// Command to set a password by presenting an invitation token
#[derive(Clone)]
pub struct ConsumeInvitationCommand {
    pub token: InvitationToken,
    pub password: String,
}

impl fmt::Debug for ConsumeInvitationCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConsumeInvitationCommand")
            .field("token", &self.token)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::identity::models::EmailAddress;
    use crate::domain::identity::models::FullName;
    use crate::domain::identity::models::NewIdentity;

    fn identity() -> Identity {
        Identity::pending(
            ServiceProviderId::new(),
            NewIdentity {
                role: Role::Technician,
                customer_id: None,
                full_name: FullName::new("Tom Tech").unwrap(),
                email: EmailAddress::new("tom@example.com").unwrap(),
                phone_number: None,
            },
        )
    }

    #[test]
    fn test_issue_stores_digest_and_window() {
        let identity = identity();
        let token = InvitationToken::generate().unwrap();
        let now = Utc::now();

        let invitation = Invitation::issue(&identity, &token, IdentityId::new(), now);

        assert_eq!(invitation.token_hash, token.digest());
        assert_ne!(invitation.token_hash, token.expose());
        assert_eq!(invitation.expires_at - now, Duration::hours(48));
        assert_eq!(invitation.identity_id, identity.id);
        assert_eq!(invitation.service_provider_id, identity.service_provider_id);
    }

    #[test]
    fn test_usable_window() {
        let token = InvitationToken::generate().unwrap();
        let now = Utc::now();
        let mut invitation = Invitation::issue(&identity(), &token, IdentityId::new(), now);

        assert!(invitation.is_usable_at(now));
        assert!(!invitation.is_usable_at(invitation.expires_at));

        invitation.consumed_at = Some(now);
        assert!(!invitation.is_usable_at(now));
    }

    #[test]
    fn test_command_debug_redacts_secrets() {
        let command = ConsumeInvitationCommand {
            token: InvitationToken::presented("plaintext-token"),
            password: "longenough1".to_string(),
        };

        let debug = format!("{:?}", command);
        assert!(!debug.contains("plaintext-token"));
        assert!(!debug.contains("longenough1"));
    }
}
