use std::fmt;
use std::str::FromStr;

use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use crate::domain::identity::errors::EmailError;
use crate::domain::identity::errors::FullNameError;
use crate::domain::identity::errors::IdentityError;
use crate::domain::identity::errors::RoleError;
use crate::domain::ids::CustomerId;
use crate::domain::ids::IdentityId;
use crate::domain::ids::ServiceProviderId;

/// Identity aggregate entity.
///
/// A login-capable (or pending) account owned by one service provider.
/// `customer_id` is present iff `role` is [`Role::Client`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub id: IdentityId,
    pub service_provider_id: ServiceProviderId,
    pub customer_id: Option<CustomerId>,
    pub full_name: FullName,
    pub email: EmailAddress,
    pub phone_number: Option<String>,
    pub role: Role,
    pub active: bool,
    pub password: PasswordState,
    pub created_at: DateTime<Utc>,
}

impl Identity {
    /// Build a pending identity from validated attributes.
    ///
    /// The identity is active but cannot log in until an invitation is
    /// consumed and a real password hash replaces the unset state.
    pub fn pending(service_provider_id: ServiceProviderId, attributes: NewIdentity) -> Self {
        Self {
            id: IdentityId::new(),
            service_provider_id,
            customer_id: attributes.customer_id,
            full_name: attributes.full_name,
            email: attributes.email,
            phone_number: attributes.phone_number,
            role: attributes.role,
            active: true,
            password: PasswordState::Unset,
            created_at: Utc::now(),
        }
    }

    pub fn is_pending(&self) -> bool {
        !self.password.is_set()
    }
}

/// Account role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Dispatcher,
    Technician,
    Client,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Admin, Role::Dispatcher, Role::Technician, Role::Client];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Dispatcher => "dispatcher",
            Role::Technician => "technician",
            Role::Client => "client",
        }
    }

    /// Whether identities with this role must be bound to a customer.
    pub fn requires_customer(&self) -> bool {
        matches!(self, Role::Client)
    }
}

impl FromStr for Role {
    type Err = RoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "dispatcher" => Ok(Role::Dispatcher),
            "technician" => Ok(Role::Technician),
            "client" => Ok(Role::Client),
            _ => Err(RoleError::Unknown(s.to_string())),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalized email address type
///
/// Trimmed and lower-cased, then validated with the RFC 5322 parser. Email
/// uniqueness is enforced per service provider on the normalized value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Create a new normalized email address.
    ///
    /// # Arguments
    /// * `email` - Raw email string
    ///
    /// # Returns
    /// Validated EmailAddress value object
    ///
    /// # Errors
    /// * `Empty` - Email is blank after trimming
    /// * `InvalidFormat` - Email does not conform to RFC 5322
    pub fn new(email: &str) -> Result<Self, EmailError> {
        let normalized = email.trim().to_lowercase();
        if normalized.is_empty() {
            return Err(EmailError::Empty);
        }

        email_address::EmailAddress::from_str(&normalized)
            .map(|_| EmailAddress(normalized))
            .map_err(|e| EmailError::InvalidFormat(e.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Display name of an identity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FullName(String);

impl FullName {
    const MAX_LENGTH: usize = 200;

    /// Create a full name, trimming surrounding whitespace.
    ///
    /// # Errors
    /// * `Empty` - Name is blank
    /// * `TooLong` - Name longer than 200 characters
    pub fn new(name: &str) -> Result<Self, FullNameError> {
        let trimmed = name.trim();
        let length = trimmed.chars().count();
        if length == 0 {
            Err(FullNameError::Empty)
        } else if length > Self::MAX_LENGTH {
            Err(FullNameError::TooLong {
                max: Self::MAX_LENGTH,
                actual: length,
            })
        } else {
            Ok(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Stored credential state of an identity.
#[derive(Clone, PartialEq, Eq)]
pub enum PasswordState {
    /// Pending invitation; no password can ever verify.
    Unset,
    /// Argon2 PHC string.
    Hashed(String),
}

impl PasswordState {
    /// Value persisted for identities without a password.
    pub const UNSET_SENTINEL: &'static str = "!INVITED_USER_NO_PASSWORD!";

    /// Interpret a stored column value.
    pub fn from_stored(stored: String) -> Self {
        if stored == Self::UNSET_SENTINEL || stored.is_empty() {
            PasswordState::Unset
        } else {
            PasswordState::Hashed(stored)
        }
    }

    /// Value to persist.
    pub fn as_stored(&self) -> &str {
        match self {
            PasswordState::Unset => Self::UNSET_SENTINEL,
            PasswordState::Hashed(hash) => hash,
        }
    }

    /// Hash to verify against, if any.
    pub fn as_hash(&self) -> Option<&str> {
        match self {
            PasswordState::Unset => None,
            PasswordState::Hashed(hash) => Some(hash),
        }
    }

    pub fn is_set(&self) -> bool {
        matches!(self, PasswordState::Hashed(_))
    }
}

impl fmt::Debug for PasswordState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PasswordState::Unset => f.write_str("Unset"),
            PasswordState::Hashed(_) => f.write_str("Hashed(<redacted>)"),
        }
    }
}

/// Validated attributes of an identity to provision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewIdentity {
    pub role: Role,
    pub customer_id: Option<CustomerId>,
    pub full_name: FullName,
    pub email: EmailAddress,
    pub phone_number: Option<String>,
}

/// Command to create a new user, as received at the boundary.
///
/// Role and customer are parsed because authorization needs them. The
/// remaining attributes are validated by the service after authorization
/// succeeds.
#[derive(Debug, Clone)]
pub struct CreateUserCommand {
    pub role: Role,
    pub customer_id: Option<CustomerId>,
    pub full_name: String,
    pub email: String,
    pub phone_number: Option<String>,
}

impl CreateUserCommand {
    /// Normalize and validate the descriptive attributes.
    ///
    /// # Errors
    /// * `FullNameError` / `EmailError` wrapped in `IdentityError`
    pub fn validate(self) -> Result<NewIdentity, IdentityError> {
        let full_name = FullName::new(&self.full_name)?;
        let email = EmailAddress::new(&self.email)?;
        let phone_number = self
            .phone_number
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty());

        Ok(NewIdentity {
            role: self.role,
            customer_id: self.customer_id,
            full_name,
            email,
            phone_number,
        })
    }
}

/// Result of provisioning a user account
#[derive(Debug, Clone)]
pub struct ProvisionedUser {
    pub identity: Identity,
    pub invitation_expires_at: DateTime<Utc>,
    pub invite_sent: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_is_normalized() {
        let email = EmailAddress::new("  Jane.Doe@Example.COM ").unwrap();
        assert_eq!(email.as_str(), "jane.doe@example.com");
    }

    #[test]
    fn test_email_rejects_blank_and_malformed() {
        assert_eq!(EmailAddress::new("   "), Err(EmailError::Empty));
        assert!(matches!(
            EmailAddress::new("not-an-email"),
            Err(EmailError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_role_parsing() {
        assert_eq!("Dispatcher".parse::<Role>(), Ok(Role::Dispatcher));
        assert_eq!(" client ".parse::<Role>(), Ok(Role::Client));
        assert!(matches!("owner".parse::<Role>(), Err(RoleError::Unknown(_))));
    }

    #[test]
    fn test_password_state_sentinel_round_trip() {
        let state = PasswordState::from_stored(PasswordState::UNSET_SENTINEL.to_string());
        assert_eq!(state, PasswordState::Unset);
        assert_eq!(state.as_hash(), None);
        assert_eq!(state.as_stored(), PasswordState::UNSET_SENTINEL);

        let hashed = PasswordState::from_stored("$argon2id$v=19$abc".to_string());
        assert!(hashed.is_set());
        assert_eq!(format!("{:?}", hashed), "Hashed(<redacted>)");
    }

    #[test]
    fn test_full_name_limits() {
        assert_eq!(FullName::new(" Ana ").unwrap().as_str(), "Ana");
        assert_eq!(FullName::new("  "), Err(FullNameError::Empty));
        assert!(matches!(
            FullName::new(&"x".repeat(201)),
            Err(FullNameError::TooLong { .. })
        ));
    }

    #[test]
    fn test_create_user_command_validation_drops_blank_phone() {
        let command = CreateUserCommand {
            role: Role::Technician,
            customer_id: None,
            full_name: "Tom Tech".to_string(),
            email: "TOM@example.com".to_string(),
            phone_number: Some("   ".to_string()),
        };

        let attributes = command.validate().unwrap();
        assert_eq!(attributes.email.as_str(), "tom@example.com");
        assert_eq!(attributes.phone_number, None);
    }
}
