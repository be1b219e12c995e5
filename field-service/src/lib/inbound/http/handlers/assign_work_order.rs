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
use crate::domain::ids::IdentityId;
use crate::domain::ids::WorkOrderId;
use crate::inbound::http::router::AppState;

#[derive(Debug, Deserialize)]
pub struct AssignWorkOrderRequest {
    #[serde(default)]
    pub assigned_to: String,
}

pub async fn assign_work_order(
    State(state): State<AppState>,
    Extension(ctx): Extension<IdentityContext>,
    Path(id): Path<String>,
    Json(req): Json<AssignWorkOrderRequest>,
) -> Result<ApiSuccess<WorkOrderData>, ApiError> {
    let id = parse_id("work order id", &id, WorkOrderId::from_string)?;
    let technician_id = parse_id("assigned_to", &req.assigned_to, IdentityId::from_string)?;

    state
        .work_order_service
        .assign_work_order(&ctx, &id, &technician_id)
        .await
        .map_err(ApiError::from)
        .map(|wo| ApiSuccess::new(StatusCode::OK, (&wo).into()))
}
