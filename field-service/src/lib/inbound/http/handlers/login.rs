use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::domain::authentication::models::LoginCommand;
use crate::domain::identity::models::Identity;
use crate::inbound::http::router::AppState;

pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequestBody>,
) -> Result<ApiSuccess<LoginResponseData>, ApiError> {
    let session = state
        .authentication_service
        .login(LoginCommand {
            service_provider_id: body.service_provider_id,
            email: body.email,
            password: body.password,
        })
        .await?;

    Ok(ApiSuccess::new(
        StatusCode::OK,
        LoginResponseData {
            access_token: session.access_token,
            token_type: "Bearer".to_string(),
            user: (&session.identity).into(),
        },
    ))
}

/// Missing fields deserialize empty and are rejected by the service.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct LoginRequestBody {
    #[serde(default)]
    service_provider_id: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginResponseData {
    pub access_token: String,
    pub token_type: String,
    pub user: IdentityData,
}

/// Public view of an identity. Never carries the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdentityData {
    pub id: String,
    pub service_provider_id: String,
    pub customer_id: Option<String>,
    pub full_name: String,
    pub email: String,
    pub phone_number: Option<String>,
    pub role: String,
    pub active: bool,
    pub password_set: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&Identity> for IdentityData {
    fn from(identity: &Identity) -> Self {
        Self {
            id: identity.id.to_string(),
            service_provider_id: identity.service_provider_id.to_string(),
            customer_id: identity.customer_id.map(|c| c.to_string()),
            full_name: identity.full_name.as_str().to_string(),
            email: identity.email.as_str().to_string(),
            phone_number: identity.phone_number.clone(),
            role: identity.role.as_str().to_string(),
            active: identity.active,
            password_set: identity.password.is_set(),
            created_at: identity.created_at,
        }
    }
}
