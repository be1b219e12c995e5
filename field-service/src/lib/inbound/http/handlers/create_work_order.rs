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
use crate::domain::ids::AssetId;
use crate::domain::ids::CustomerId;
use crate::domain::ids::IdentityId;
use crate::domain::ids::SiteId;
use crate::domain::work_order::errors::WorkOrderError;
use crate::domain::work_order::models::CreateWorkOrderCommand;
use crate::inbound::http::router::AppState;

/// HTTP request body for creating a work order (raw JSON)
#[derive(Debug, Deserialize)]
pub struct CreateWorkOrderRequest {
    pub customer_id: Option<String>,
    pub site_id: Option<String>,
    pub asset_id: Option<String>,
    #[serde(rename = "type")]
    pub work_order_type: Option<String>,
    pub priority: Option<String>,
    #[serde(default)]
    pub title: String,
    pub description: Option<String>,
    pub notes: Option<String>,
    pub assigned_to: Option<String>,
}

fn optional_id<T>(
    field: &str,
    value: Option<String>,
    parse: fn(&str) -> Result<T, crate::domain::errors::IdError>,
) -> Result<Option<T>, ApiError> {
    value
        .filter(|v| !v.trim().is_empty())
        .map(|v| parse_id(field, &v, parse))
        .transpose()
}

impl CreateWorkOrderRequest {
    fn try_into_command(self) -> Result<CreateWorkOrderCommand, ApiError> {
        let work_order_type = self
            .work_order_type
            .map(|t| t.parse())
            .transpose()
            .map_err(|e| ApiError::from(WorkOrderError::InvalidValue(e)))?;
        let priority = self
            .priority
            .map(|p| p.parse())
            .transpose()
            .map_err(|e| ApiError::from(WorkOrderError::InvalidValue(e)))?;

        Ok(CreateWorkOrderCommand {
            customer_id: optional_id("customer_id", self.customer_id, CustomerId::from_string)?,
            site_id: optional_id("site_id", self.site_id, SiteId::from_string)?,
            asset_id: optional_id("asset_id", self.asset_id, AssetId::from_string)?,
            work_order_type,
            priority,
            title: self.title,
            description: self.description,
            notes: self.notes,
            assigned_to: optional_id("assigned_to", self.assigned_to, IdentityId::from_string)?,
        })
    }
}

pub async fn create_work_order(
    State(state): State<AppState>,
    Extension(ctx): Extension<IdentityContext>,
    Json(req): Json<CreateWorkOrderRequest>,
) -> Result<ApiSuccess<WorkOrderData>, ApiError> {
    let command = req.try_into_command()?;

    state
        .work_order_service
        .create_work_order(&ctx, command)
        .await
        .map_err(ApiError::from)
        .map(|wo| ApiSuccess::new(StatusCode::CREATED, (&wo).into()))
}
