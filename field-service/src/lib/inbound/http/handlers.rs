use std::fmt;

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use serde::Serialize;

use crate::domain::authentication::errors::AuthenticationError;
use crate::domain::authorization::errors::AuthorizationError;
use crate::domain::errors::StoreError;
use crate::domain::identity::errors::IdentityError;
use crate::domain::invitation::errors::InvitationError;
use crate::domain::report::errors::ReportError;
use crate::domain::work_order::errors::WorkOrderError;

pub mod assign_work_order;
pub mod complete_work_order;
pub mod create_user;
pub mod create_work_order;
pub mod list_work_orders;
pub mod login;
pub mod me;
pub mod monthly_report;
pub mod reinvite_user;
pub mod set_password;
pub mod set_user_active;

#[derive(Debug, Clone)]
pub struct ApiSuccess<T: Serialize + PartialEq>(StatusCode, Json<ApiResponseBody<T>>);

impl<T> PartialEq for ApiSuccess<T>
where
    T: Serialize + PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0 && self.1 .0 == other.1 .0
    }
}

impl<T: Serialize + PartialEq> ApiSuccess<T> {
    pub fn new(status: StatusCode, data: T) -> Self {
        ApiSuccess(status, Json(ApiResponseBody::new(status, data)))
    }
}

impl<T: Serialize + PartialEq> IntoResponse for ApiSuccess<T> {
    fn into_response(self) -> Response {
        (self.0, self.1).into_response()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    InternalServerError(String),
    ServiceUnavailable(String),
    BadRequest(String),
    Unauthorized(String),
    Forbidden(String),
    NotFound(String),
    Conflict(String),
}

impl ApiError {
    pub fn missing_bearer_token() -> Self {
        ApiError::Unauthorized("missing bearer token".to_string())
    }

    pub fn invalid_token() -> Self {
        ApiError::Unauthorized("invalid token".to_string())
    }

    /// Log the underlying failure and hide it from the client.
    fn internal(err: impl fmt::Display) -> Self {
        tracing::error!(error = %err, "Request failed");
        ApiError::InternalServerError("internal server error".to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::InternalServerError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            ApiError::ServiceUnavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
        };

        (status, Json(ApiResponseBody::new_error(status, message))).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        if err.is_transient() {
            tracing::warn!(error = %err, "Store unavailable");
            ApiError::ServiceUnavailable("service temporarily unavailable".to_string())
        } else {
            ApiError::internal(err)
        }
    }
}

impl From<AuthorizationError> for ApiError {
    fn from(err: AuthorizationError) -> Self {
        match err {
            AuthorizationError::Denied => ApiError::Forbidden("forbidden".to_string()),
            AuthorizationError::Validation(msg) => ApiError::BadRequest(msg),
        }
    }
}

impl From<AuthenticationError> for ApiError {
    fn from(err: AuthenticationError) -> Self {
        match err {
            AuthenticationError::InvalidCredentials => {
                ApiError::Unauthorized("invalid credentials".to_string())
            }
            AuthenticationError::AccountDisabled => {
                ApiError::Forbidden("account disabled".to_string())
            }
            AuthenticationError::Validation(msg) => ApiError::BadRequest(msg),
            AuthenticationError::Store(e) => e.into(),
            AuthenticationError::Credential(_) | AuthenticationError::Token(_) => {
                ApiError::internal(err)
            }
        }
    }
}

impl From<InvitationError> for ApiError {
    fn from(err: InvitationError) -> Self {
        match err {
            InvitationError::InvalidOrExpiredToken => {
                ApiError::BadRequest("invalid or expired token".to_string())
            }
            InvitationError::WeakPassword(e) => ApiError::BadRequest(e.to_string()),
            InvitationError::Store(e) => e.into(),
            InvitationError::Token(_) | InvitationError::Credential(_) => ApiError::internal(err),
        }
    }
}

impl From<IdentityError> for ApiError {
    fn from(err: IdentityError) -> Self {
        match err {
            IdentityError::InvalidRole(_)
            | IdentityError::InvalidEmail(_)
            | IdentityError::InvalidFullName(_)
            | IdentityError::Validation(_) => ApiError::BadRequest(err.to_string()),
            IdentityError::Authorization(e) => e.into(),
            IdentityError::NotFound(_) => ApiError::NotFound(err.to_string()),
            IdentityError::EmailAlreadyExists(_) | IdentityError::Conflict(_) => {
                ApiError::Conflict(err.to_string())
            }
            IdentityError::Invitation(e) => e.into(),
            IdentityError::Store(e) => e.into(),
        }
    }
}

impl From<WorkOrderError> for ApiError {
    fn from(err: WorkOrderError) -> Self {
        match err {
            WorkOrderError::Authorization(e) => e.into(),
            WorkOrderError::InvalidValue(_) | WorkOrderError::Validation(_) => {
                ApiError::BadRequest(err.to_string())
            }
            WorkOrderError::NotFound(_) => ApiError::NotFound(err.to_string()),
            WorkOrderError::Conflict(_) => ApiError::Conflict(err.to_string()),
            WorkOrderError::Store(e) => e.into(),
        }
    }
}

impl From<ReportError> for ApiError {
    fn from(err: ReportError) -> Self {
        match err {
            ReportError::Authorization(e) => e.into(),
            ReportError::InvalidPeriod(e) => ApiError::BadRequest(e.to_string()),
            ReportError::NotFound(_) => ApiError::NotFound(err.to_string()),
            ReportError::Store(e) => e.into(),
        }
    }
}

/// Parse an identifier taken from a path or body field.
pub(crate) fn parse_id<T>(
    field: &str,
    raw: &str,
    parse: impl FnOnce(&str) -> Result<T, crate::domain::errors::IdError>,
) -> Result<T, ApiError> {
    parse(raw).map_err(|_| ApiError::BadRequest(format!("invalid {}", field)))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiResponseBody<T: Serialize + PartialEq> {
    status_code: u16,
    data: T,
}

impl<T: Serialize + PartialEq> ApiResponseBody<T> {
    pub fn new(status_code: StatusCode, data: T) -> Self {
        Self {
            status_code: status_code.as_u16(),
            data,
        }
    }
}

impl ApiResponseBody<ApiErrorData> {
    pub fn new_error(status_code: StatusCode, message: String) -> Self {
        Self {
            status_code: status_code.as_u16(),
            data: ApiErrorData { message },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiErrorData {
    pub message: String,
}
