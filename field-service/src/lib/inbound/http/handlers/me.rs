use axum::http::StatusCode;
use axum::Extension;
use chrono::DateTime;
use chrono::Utc;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::domain::identity::context::IdentityContext;

pub async fn me(
    Extension(ctx): Extension<IdentityContext>,
) -> Result<ApiSuccess<MeResponseData>, ApiError> {
    Ok(ApiSuccess::new(StatusCode::OK, (&ctx).into()))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MeResponseData {
    pub user_id: String,
    pub service_provider_id: String,
    pub customer_id: Option<String>,
    pub role: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl From<&IdentityContext> for MeResponseData {
    fn from(ctx: &IdentityContext) -> Self {
        Self {
            user_id: ctx.user_id().to_string(),
            service_provider_id: ctx.service_provider_id().to_string(),
            customer_id: ctx.customer_id().map(|c| c.to_string()),
            role: ctx.role().as_str().to_string(),
            issued_at: ctx.issued_at(),
            expires_at: ctx.expires_at(),
        }
    }
}
