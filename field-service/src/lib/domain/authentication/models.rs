use crate::domain::identity::models::Identity;

/// Login attempt as received at the boundary
#[derive(Clone)]
pub struct LoginCommand {
    pub service_provider_id: String,
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for LoginCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginCommand")
            .field("service_provider_id", &self.service_provider_id)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Successful login
#[derive(Debug, Clone)]
pub struct Session {
    pub access_token: String,
    pub identity: Identity,
}
