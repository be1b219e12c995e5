use auth::InvitationToken;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::domain::invitation::models::ConsumeInvitationCommand;
use crate::inbound::http::router::AppState;

/// Consume an invitation token and set the invitee's first password.
pub async fn set_password(
    State(state): State<AppState>,
    Json(body): Json<SetPasswordRequestBody>,
) -> Result<ApiSuccess<SetPasswordResponseData>, ApiError> {
    state
        .invitation_service
        .consume_invitation(ConsumeInvitationCommand {
            token: InvitationToken::presented(body.token.trim()),
            password: body.password,
        })
        .await?;

    Ok(ApiSuccess::new(
        StatusCode::OK,
        SetPasswordResponseData {
            message: "password set".to_string(),
        },
    ))
}

#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct SetPasswordRequestBody {
    #[serde(default)]
    token: String,
    #[serde(default)]
    password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SetPasswordResponseData {
    pub message: String,
}
