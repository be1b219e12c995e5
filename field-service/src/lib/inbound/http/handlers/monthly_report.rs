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
use crate::domain::report::models::MonthlyReport;
use crate::domain::report::models::ReportEntry;
use crate::inbound::http::router::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct MonthlyReportParams {
    pub month: Option<String>,
    pub customer_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportEntryData {
    pub work_order_id: String,
    pub completed_at: DateTime<Utc>,
    pub site_name: String,
    pub asset_tag: String,
    pub asset_name: Option<String>,
    #[serde(rename = "type")]
    pub work_order_type: String,
    pub priority: String,
    pub title: String,
}

impl From<&ReportEntry> for ReportEntryData {
    fn from(entry: &ReportEntry) -> Self {
        Self {
            work_order_id: entry.work_order_id.to_string(),
            completed_at: entry.completed_at,
            site_name: entry.site_name.clone(),
            asset_tag: entry.asset_tag.clone(),
            asset_name: entry.asset_name.clone(),
            work_order_type: entry.work_order_type.as_str().to_string(),
            priority: entry.priority.as_str().to_string(),
            title: entry.title.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyReportData {
    pub month: String,
    pub service_provider_name: String,
    pub customer_name: String,
    pub work_orders: Vec<ReportEntryData>,
}

impl From<&MonthlyReport> for MonthlyReportData {
    fn from(report: &MonthlyReport) -> Self {
        Self {
            month: report.period.to_string(),
            service_provider_name: report.header.service_provider_name.clone(),
            customer_name: report.header.customer_name.clone(),
            work_orders: report.entries.iter().map(ReportEntryData::from).collect(),
        }
    }
}

/// Completed work orders for one customer and calendar month.
pub async fn monthly_report(
    State(state): State<AppState>,
    Extension(ctx): Extension<IdentityContext>,
    Query(params): Query<MonthlyReportParams>,
) -> Result<ApiSuccess<MonthlyReportData>, ApiError> {
    let customer_id = params
        .customer_id
        .filter(|c| !c.trim().is_empty())
        .map(|c| parse_id("customer_id", &c, CustomerId::from_string))
        .transpose()?;
    let month = params.month.unwrap_or_default();

    state
        .report_service
        .monthly_report(&ctx, &month, customer_id)
        .await
        .map_err(ApiError::from)
        .map(|report| ApiSuccess::new(StatusCode::OK, (&report).into()))
}
