use axum::extract::Query;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use super::parse_id;
use super::ApiError;
use super::ApiSuccess;
use crate::domain::identity::context::IdentityContext;
use crate::domain::ids::CustomerId;
use crate::domain::work_order::errors::WorkOrderError;
use crate::domain::work_order::models::ListWorkOrdersQuery;
use crate::domain::work_order::models::WorkOrder;
use crate::inbound::http::router::AppState;

/// Query string, kept as raw strings so malformed values produce the
/// standard error envelope.
#[derive(Debug, Default, Deserialize)]
pub struct ListWorkOrdersParams {
    pub customer_id: Option<String>,
    pub status: Option<String>,
    pub limit: Option<String>,
    pub offset: Option<String>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn parse_count(field: &str, value: Option<String>) -> Result<Option<u32>, ApiError> {
    non_blank(value)
        .map(|v| {
            v.trim()
                .parse::<u32>()
                .map_err(|_| ApiError::BadRequest(format!("invalid {}", field)))
        })
        .transpose()
}

impl ListWorkOrdersParams {
    fn try_into_query(self) -> Result<ListWorkOrdersQuery, ApiError> {
        let customer_id = non_blank(self.customer_id)
            .map(|c| parse_id("customer_id", &c, CustomerId::from_string))
            .transpose()?;
        let status = non_blank(self.status)
            .map(|s| s.parse())
            .transpose()
            .map_err(|e| ApiError::from(WorkOrderError::InvalidValue(e)))?;

        Ok(ListWorkOrdersQuery {
            customer_id,
            status,
            limit: parse_count("limit", self.limit)?,
            offset: parse_count("offset", self.offset)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkOrderData {
    pub id: String,
    pub service_provider_id: String,
    pub customer_id: String,
    pub site_id: String,
    pub asset_id: String,
    #[serde(rename = "type")]
    pub work_order_type: String,
    pub priority: String,
    pub status: String,
    pub title: String,
    pub description: Option<String>,
    pub notes: Option<String>,
    pub assigned_to: Option<String>,
    pub created_by: String,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<&WorkOrder> for WorkOrderData {
    fn from(wo: &WorkOrder) -> Self {
        Self {
            id: wo.id.to_string(),
            service_provider_id: wo.service_provider_id.to_string(),
            customer_id: wo.customer_id.to_string(),
            site_id: wo.site_id.to_string(),
            asset_id: wo.asset_id.to_string(),
            work_order_type: wo.work_order_type.as_str().to_string(),
            priority: wo.priority.as_str().to_string(),
            status: wo.status.as_str().to_string(),
            title: wo.title.clone(),
            description: wo.description.clone(),
            notes: wo.notes.clone(),
            assigned_to: wo.assigned_to.map(|a| a.to_string()),
            created_by: wo.created_by.to_string(),
            completed_at: wo.completed_at,
            created_at: wo.created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkOrderListData {
    pub work_orders: Vec<WorkOrderData>,
}

pub async fn list_work_orders(
    State(state): State<AppState>,
    Extension(ctx): Extension<IdentityContext>,
    Query(params): Query<ListWorkOrdersParams>,
) -> Result<ApiSuccess<WorkOrderListData>, ApiError> {
    let query = params.try_into_query()?;

    let work_orders = state
        .work_order_service
        .list_work_orders(&ctx, query)
        .await?;

    Ok(ApiSuccess::new(
        StatusCode::OK,
        WorkOrderListData {
            work_orders: work_orders.iter().map(WorkOrderData::from).collect(),
        },
    ))
}
