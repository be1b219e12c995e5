//! Strongly typed record identifiers.

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

use crate::domain::errors::IdError;

macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Generate a new random identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Parse an identifier from string, ignoring surrounding whitespace.
            ///
            /// # Errors
            /// * `InvalidFormat` - String is not a valid UUID
            pub fn from_string(s: &str) -> Result<Self, IdError> {
                Uuid::parse_str(s.trim())
                    .map($name)
                    .map_err(|e| IdError::InvalidFormat(e.to_string()))
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }
    };
}

uuid_id!(
    /// Identity (user account) identifier
    IdentityId
);
uuid_id!(
    /// Service provider (tenant root) identifier
    ServiceProviderId
);
uuid_id!(
    /// Customer identifier, scoped under a service provider
    CustomerId
);
uuid_id!(
    /// Customer site identifier
    SiteId
);
uuid_id!(
    /// Serviced asset identifier
    AssetId
);
uuid_id!(
    /// Invitation identifier
    InvitationId
);
uuid_id!(
    /// Work order identifier
    WorkOrderId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_string_trims_whitespace() {
        let id = CustomerId::new();
        let parsed = CustomerId::from_string(&format!("  {}\n", id)).unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn test_from_string_rejects_garbage() {
        let result = IdentityId::from_string("not-a-uuid");
        assert!(matches!(result, Err(IdError::InvalidFormat(_))));
    }

    #[test]
    fn test_serializes_as_plain_uuid() {
        let id = WorkOrderId::new();
        let json = serde_json::to_value(id).unwrap();
        assert_eq!(json, serde_json::json!(id.0.to_string()));
    }
}
