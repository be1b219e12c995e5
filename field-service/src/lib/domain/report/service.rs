use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::authorization::models::AccessRequest;
use crate::domain::authorization::models::Operation;
use crate::domain::authorization::models::Resource;
use crate::domain::authorization::AuthorizationEngine;
use crate::domain::identity::context::IdentityContext;
use crate::domain::ids::CustomerId;
use crate::domain::report::errors::ReportError;
use crate::domain::report::models::MonthlyReport;
use crate::domain::report::models::ReportPeriod;
use crate::domain::report::ports::ReportRepository;
use crate::domain::report::ports::ReportServicePort;

pub struct ReportService<RR>
where
    RR: ReportRepository,
{
    repository: Arc<RR>,
    engine: AuthorizationEngine,
}

impl<RR> ReportService<RR>
where
    RR: ReportRepository,
{
    pub fn new(repository: Arc<RR>) -> Self {
        Self {
            repository,
            engine: AuthorizationEngine::new(),
        }
    }
}

#[async_trait]
impl<RR> ReportServicePort for ReportService<RR>
where
    RR: ReportRepository,
{
    async fn monthly_report(
        &self,
        ctx: &IdentityContext,
        month: &str,
        customer_id: Option<CustomerId>,
    ) -> Result<MonthlyReport, ReportError> {
        let request =
            AccessRequest::new(Resource::Report, Operation::Read).for_customer(customer_id);
        let scope = self.engine.authorize(ctx, &request)?;
        let period: ReportPeriod = month.parse()?;

        let customer_id = scope
            .customer_id()
            .ok_or_else(|| ReportError::NotFound("customer".to_string()))?;
        let header = self
            .repository
            .report_header(&scope.service_provider_id(), &customer_id)
            .await?
            .ok_or_else(|| ReportError::NotFound(customer_id.to_string()))?;

        let entries = self
            .repository
            .completed_in_window(&scope, period.start(), period.end())
            .await?;

        tracing::debug!(
            customer_id = %customer_id,
            period = %period,
            entries = entries.len(),
            "Monthly report assembled"
        );

        Ok(MonthlyReport {
            period,
            header,
            entries,
        })
    }
}
