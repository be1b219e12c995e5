use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;

use super::create_user::ProvisionedUserData;
use super::parse_id;
use super::ApiError;
use super::ApiSuccess;
use crate::domain::identity::context::IdentityContext;
use crate::domain::ids::IdentityId;
use crate::inbound::http::router::AppState;

/// Issue a fresh invitation for a user that has not set a password yet.
pub async fn reinvite_user(
    State(state): State<AppState>,
    Extension(ctx): Extension<IdentityContext>,
    Path(user_id): Path<String>,
) -> Result<ApiSuccess<ProvisionedUserData>, ApiError> {
    let user_id = parse_id("user_id", &user_id, IdentityId::from_string)?;

    state
        .identity_service
        .reinvite(&ctx, &user_id)
        .await
        .map_err(ApiError::from)
        .map(|provisioned| ApiSuccess::new(StatusCode::CREATED, (&provisioned).into()))
}
