use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use axum::Json;
use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use super::login::IdentityData;
use super::parse_id;
use super::ApiError;
use super::ApiSuccess;
use crate::domain::identity::context::IdentityContext;
use crate::domain::identity::errors::IdentityError;
use crate::domain::identity::models::CreateUserCommand;
use crate::domain::identity::models::ProvisionedUser;
use crate::domain::identity::models::Role;
use crate::domain::ids::CustomerId;
use crate::inbound::http::router::AppState;

/// HTTP request body for provisioning a user (raw JSON)
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub role: String,
    pub customer_id: Option<String>,
    pub full_name: String,
    pub email: String,
    pub phone_number: Option<String>,
}

impl CreateUserRequest {
    fn try_into_command(self) -> Result<CreateUserCommand, ApiError> {
        let role: Role = self
            .role
            .parse()
            .map_err(|e| ApiError::from(IdentityError::InvalidRole(e)))?;
        let customer_id = self
            .customer_id
            .filter(|c| !c.trim().is_empty())
            .map(|c| parse_id("customer_id", &c, CustomerId::from_string))
            .transpose()?;

        Ok(CreateUserCommand {
            role,
            customer_id,
            full_name: self.full_name,
            email: self.email,
            phone_number: self.phone_number,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProvisionedUserData {
    pub user: IdentityData,
    pub invitation_expires_at: DateTime<Utc>,
    pub invite_sent: bool,
}

impl From<&ProvisionedUser> for ProvisionedUserData {
    fn from(provisioned: &ProvisionedUser) -> Self {
        Self {
            user: (&provisioned.identity).into(),
            invitation_expires_at: provisioned.invitation_expires_at,
            invite_sent: provisioned.invite_sent,
        }
    }
}

pub async fn create_user(
    State(state): State<AppState>,
    Extension(ctx): Extension<IdentityContext>,
    Json(req): Json<CreateUserRequest>,
) -> Result<ApiSuccess<ProvisionedUserData>, ApiError> {
    let command = req.try_into_command()?;

    state
        .identity_service
        .create_user(&ctx, command)
        .await
        .map_err(ApiError::from)
        .map(|provisioned| ApiSuccess::new(StatusCode::CREATED, (&provisioned).into()))
}
