use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use axum::Json;
use serde::Deserialize;

use super::login::IdentityData;
use super::parse_id;
use super::ApiError;
use super::ApiSuccess;
use crate::domain::identity::context::IdentityContext;
use crate::domain::ids::IdentityId;
use crate::inbound::http::router::AppState;

#[derive(Debug, Deserialize)]
pub struct SetUserActiveRequest {
    pub active: bool,
}

pub async fn set_user_active(
    State(state): State<AppState>,
    Extension(ctx): Extension<IdentityContext>,
    Path(user_id): Path<String>,
    Json(req): Json<SetUserActiveRequest>,
) -> Result<ApiSuccess<IdentityData>, ApiError> {
    let user_id = parse_id("user_id", &user_id, IdentityId::from_string)?;

    state
        .identity_service
        .set_active(&ctx, &user_id, req.active)
        .await
        .map_err(ApiError::from)
        .map(|identity| ApiSuccess::new(StatusCode::OK, (&identity).into()))
}
