use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

/// Lifetime of a session token.
pub const SESSION_TTL_HOURS: i64 = 24;

/// Identity claims carried by a session token.
///
/// Field names are kept short since they travel with every request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionClaims {
    /// Subject (user identifier)
    pub sub: String,

    /// Service provider (tenant) identifier
    pub spid: String,

    /// Customer identifier, present for client accounts only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cid: Option<String>,

    /// Role name
    pub role: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl SessionClaims {
    /// Create claims for an identity, valid for [`SESSION_TTL_HOURS`] from now.
    ///
    /// # Arguments
    /// * `user_id` - Unique user identifier
    /// * `service_provider_id` - Owning tenant identifier
    /// * `role` - Role name
    ///
    /// # Returns
    /// Claims with sub, spid, role, iat and exp set
    pub fn for_identity(
        user_id: impl ToString,
        service_provider_id: impl ToString,
        role: impl ToString,
    ) -> Self {
        let now = Utc::now();

        Self {
            sub: user_id.to_string(),
            spid: service_provider_id.to_string(),
            cid: None,
            role: role.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::hours(SESSION_TTL_HOURS)).timestamp(),
        }
    }

    /// Set the customer scope.
    pub fn with_customer(mut self, customer_id: Option<impl ToString>) -> Self {
        self.cid = customer_id.map(|id| id.to_string());
        self
    }

    /// Re-anchor the validity window at `issued_at`.
    pub fn with_validity(mut self, issued_at: DateTime<Utc>, ttl: Duration) -> Self {
        self.iat = issued_at.timestamp();
        self.exp = (issued_at + ttl).timestamp();
        self
    }

    /// Check if token is expired.
    pub fn is_expired(&self, current_timestamp: i64) -> bool {
        self.exp < current_timestamp
    }
}
