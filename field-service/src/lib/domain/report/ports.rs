use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;

use crate::domain::authorization::models::ScopePredicate;
use crate::domain::errors::StoreError;
use crate::domain::identity::context::IdentityContext;
use crate::domain::ids::CustomerId;
use crate::domain::ids::ServiceProviderId;
use crate::domain::report::errors::ReportError;
use crate::domain::report::models::MonthlyReport;
use crate::domain::report::models::ReportEntry;
use crate::domain::report::models::ReportHeader;

/// Port for monthly report data.
#[async_trait]
pub trait ReportServicePort: Send + Sync + 'static {
    /// Collect the completed work orders of one customer for a calendar month.
    ///
    /// # Arguments
    /// * `ctx` - Verified caller identity
    /// * `month` - Month in `YYYY-MM` form
    /// * `customer_id` - Customer to report on; clients may omit it
    ///
    /// # Errors
    /// * `Authorization` - Caller may not read reports for the customer
    /// * `InvalidPeriod` - Month is missing or malformed
    /// * `NotFound` - Customer does not belong to the caller's provider
    async fn monthly_report(
        &self,
        ctx: &IdentityContext,
        month: &str,
        customer_id: Option<CustomerId>,
    ) -> Result<MonthlyReport, ReportError>;
}

#[async_trait]
pub trait ReportRepository: Send + Sync + 'static {
    /// Provider and customer names, if the customer belongs to the provider.
    async fn report_header(
        &self,
        service_provider_id: &ServiceProviderId,
        customer_id: &CustomerId,
    ) -> Result<Option<ReportHeader>, StoreError>;

    /// Completed work orders inside the scope with `from <= completed_at < to`,
    /// oldest completion first.
    async fn completed_in_window(
        &self,
        scope: &ScopePredicate,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<ReportEntry>, StoreError>;
}
