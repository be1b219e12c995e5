use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use axum::Json;
use serde::Deserialize;

use super::list_work_orders::WorkOrderData;
use super::parse_id;
use super::ApiError;
use super::ApiSuccess;
use crate::domain::identity::context::IdentityContext;
use crate::domain::ids::WorkOrderId;
use crate::inbound::http::router::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct CompleteWorkOrderRequest {
    pub notes: Option<String>,
}

pub async fn complete_work_order(
    State(state): State<AppState>,
    Extension(ctx): Extension<IdentityContext>,
    Path(id): Path<String>,
    body: Option<Json<CompleteWorkOrderRequest>>,
) -> Result<ApiSuccess<WorkOrderData>, ApiError> {
    let id = parse_id("work order id", &id, WorkOrderId::from_string)?;
    let Json(req) = body.unwrap_or_default();

    state
        .work_order_service
        .complete_work_order(&ctx, &id, req.notes)
        .await
        .map_err(ApiError::from)
        .map(|wo| ApiSuccess::new(StatusCode::OK, (&wo).into()))
}
