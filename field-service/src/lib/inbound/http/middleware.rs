use auth::SessionClaims;
use axum::extract::Request;
use axum::extract::State;
use axum::middleware::Next;
use axum::response::IntoResponse;
use axum::response::Response;
use http::header::AUTHORIZATION;

use crate::domain::identity::context::IdentityContext;
use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::router::AppState;

/// Resolves the bearer token into an [`IdentityContext`] stored in the
/// request extensions. Rejects the request before any handler runs.
pub async fn resolve_identity(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, Response> {
    let token = extract_bearer_token(&req).map_err(IntoResponse::into_response)?;

    let claims: SessionClaims = state.authenticator.validate_token(token).map_err(|e| {
        tracing::debug!(error = %e, "Session token rejected");
        ApiError::invalid_token().into_response()
    })?;

    let ctx = IdentityContext::try_from(claims).map_err(|e| {
        tracing::debug!(error = %e, "Session claims rejected");
        ApiError::invalid_token().into_response()
    })?;

    req.extensions_mut().insert(ctx);

    Ok(next.run(req).await)
}

fn extract_bearer_token(req: &Request) -> Result<&str, ApiError> {
    req.headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(ApiError::missing_bearer_token)
}
