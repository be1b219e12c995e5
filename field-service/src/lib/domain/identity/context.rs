use auth::SessionClaims;
use chrono::DateTime;
use chrono::Utc;
use serde::Serialize;

use crate::domain::identity::errors::ClaimsError;
use crate::domain::identity::models::Role;
use crate::domain::ids::CustomerId;
use crate::domain::ids::IdentityId;
use crate::domain::ids::ServiceProviderId;

/// Verified, request-scoped description of the caller.
///
/// Only obtainable from verified session claims. Handlers receive it from the
/// request extensions and pass it by reference into every service call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdentityContext {
    user_id: IdentityId,
    service_provider_id: ServiceProviderId,
    role: Role,
    customer_id: Option<CustomerId>,
    issued_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl IdentityContext {
    pub fn user_id(&self) -> IdentityId {
        self.user_id
    }

    pub fn service_provider_id(&self) -> ServiceProviderId {
        self.service_provider_id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn customer_id(&self) -> Option<CustomerId> {
        self.customer_id
    }

    pub fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    #[cfg(test)]
    pub(crate) fn for_tests(
        service_provider_id: ServiceProviderId,
        role: Role,
        customer_id: Option<CustomerId>,
    ) -> Self {
        Self::for_tests_as(IdentityId::new(), service_provider_id, role, customer_id)
    }

    #[cfg(test)]
    pub(crate) fn for_tests_as(
        user_id: IdentityId,
        service_provider_id: ServiceProviderId,
        role: Role,
        customer_id: Option<CustomerId>,
    ) -> Self {
        let issued_at = Utc::now();
        Self {
            user_id,
            service_provider_id,
            role,
            customer_id,
            issued_at,
            expires_at: issued_at + chrono::Duration::hours(auth::SESSION_TTL_HOURS),
        }
    }
}

impl TryFrom<SessionClaims> for IdentityContext {
    type Error = ClaimsError;

    fn try_from(claims: SessionClaims) -> Result<Self, Self::Error> {
        let user_id = IdentityId::from_string(&claims.sub).map_err(|e| ClaimsError::Malformed {
            claim: "sub",
            reason: e.to_string(),
        })?;
        let service_provider_id =
            ServiceProviderId::from_string(&claims.spid).map_err(|e| ClaimsError::Malformed {
                claim: "spid",
                reason: e.to_string(),
            })?;
        let role = claims
            .role
            .parse::<Role>()
            .map_err(|e| ClaimsError::Malformed {
                claim: "role",
                reason: e.to_string(),
            })?;
        let customer_id = claims
            .cid
            .as_deref()
            .map(CustomerId::from_string)
            .transpose()
            .map_err(|e| ClaimsError::Malformed {
                claim: "cid",
                reason: e.to_string(),
            })?;

        if role.requires_customer() != customer_id.is_some() {
            return Err(ClaimsError::CustomerMismatch(role.to_string()));
        }

        let issued_at = timestamp(claims.iat, "iat")?;
        let expires_at = timestamp(claims.exp, "exp")?;

        Ok(Self {
            user_id,
            service_provider_id,
            role,
            customer_id,
            issued_at,
            expires_at,
        })
    }
}

fn timestamp(seconds: i64, claim: &'static str) -> Result<DateTime<Utc>, ClaimsError> {
    DateTime::<Utc>::from_timestamp(seconds, 0).ok_or(ClaimsError::Malformed {
        claim,
        reason: "timestamp out of range".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_from_valid_claims() {
        let user_id = IdentityId::new();
        let provider_id = ServiceProviderId::new();
        let customer_id = CustomerId::new();
        let claims = SessionClaims::for_identity(user_id, provider_id, "client")
            .with_customer(Some(customer_id));

        let context = IdentityContext::try_from(claims.clone()).unwrap();

        assert_eq!(context.user_id(), user_id);
        assert_eq!(context.service_provider_id(), provider_id);
        assert_eq!(context.role(), Role::Client);
        assert_eq!(context.customer_id(), Some(customer_id));
        assert_eq!(context.expires_at().timestamp(), claims.exp);
    }

    #[test]
    fn test_client_without_customer_is_rejected() {
        let claims =
            SessionClaims::for_identity(IdentityId::new(), ServiceProviderId::new(), "client");

        let result = IdentityContext::try_from(claims);
        assert!(matches!(result, Err(ClaimsError::CustomerMismatch(_))));
    }

    #[test]
    fn test_staff_with_customer_is_rejected() {
        let claims =
            SessionClaims::for_identity(IdentityId::new(), ServiceProviderId::new(), "dispatcher")
                .with_customer(Some(CustomerId::new()));

        let result = IdentityContext::try_from(claims);
        assert!(matches!(result, Err(ClaimsError::CustomerMismatch(_))));
    }

    #[test]
    fn test_unknown_role_is_rejected() {
        let claims =
            SessionClaims::for_identity(IdentityId::new(), ServiceProviderId::new(), "superuser");

        let result = IdentityContext::try_from(claims);
        assert!(matches!(
            result,
            Err(ClaimsError::Malformed { claim: "role", .. })
        ));
    }

    #[test]
    fn test_malformed_subject_is_rejected() {
        let claims = SessionClaims::for_identity("user123", ServiceProviderId::new(), "admin");

        let result = IdentityContext::try_from(claims);
        assert!(matches!(
            result,
            Err(ClaimsError::Malformed { claim: "sub", .. })
        ));
    }
}
