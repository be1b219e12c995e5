use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;

use crate::domain::authorization::models::ScopePredicate;
use crate::domain::errors::StoreError;
use crate::domain::identity::context::IdentityContext;
use crate::domain::ids::AssetId;
use crate::domain::ids::CustomerId;
use crate::domain::ids::IdentityId;
use crate::domain::ids::ServiceProviderId;
use crate::domain::ids::SiteId;
use crate::domain::ids::WorkOrderId;
use crate::domain::work_order::errors::WorkOrderError;
use crate::domain::work_order::models::CreateWorkOrderCommand;
use crate::domain::work_order::models::ListWorkOrdersQuery;
use crate::domain::work_order::models::MutationOutcome;
use crate::domain::work_order::models::WorkOrder;
use crate::domain::work_order::models::WorkOrderFilter;

/// Port for work order operations.
///
/// Every operation is authorized against the caller's identity context and
/// executed within the resulting scope.
#[async_trait]
pub trait WorkOrderServicePort: Send + Sync + 'static {
    /// List work orders visible to the caller, newest first.
    ///
    /// # Errors
    /// * `Authorization` - Caller may not read work orders in the requested scope
    /// * `Store` - Store operation failed or timed out
    async fn list_work_orders(
        &self,
        ctx: &IdentityContext,
        query: ListWorkOrdersQuery,
    ) -> Result<Vec<WorkOrder>, WorkOrderError>;

    /// Create an open work order.
    ///
    /// # Errors
    /// * `Authorization` - Caller may not create work orders, or no customer given
    /// * `Validation` - Missing fields, broken ownership chain or invalid assignee
    async fn create_work_order(
        &self,
        ctx: &IdentityContext,
        command: CreateWorkOrderCommand,
    ) -> Result<WorkOrder, WorkOrderError>;

    /// Mark a work order completed, optionally replacing its notes.
    ///
    /// # Errors
    /// * `NotFound` - Work order outside the caller's scope
    /// * `Conflict` - Work order is cancelled
    async fn complete_work_order(
        &self,
        ctx: &IdentityContext,
        id: &WorkOrderId,
        notes: Option<String>,
    ) -> Result<WorkOrder, WorkOrderError>;

    /// Assign a work order to a technician.
    ///
    /// # Errors
    /// * `Validation` - Assignee is not an active technician of the provider
    /// * `NotFound` - Work order outside the caller's scope
    /// * `Conflict` - Work order is no longer open
    async fn assign_work_order(
        &self,
        ctx: &IdentityContext,
        id: &WorkOrderId,
        technician_id: &IdentityId,
    ) -> Result<WorkOrder, WorkOrderError>;
}

/// Persistence operations for work orders.
///
/// Implementations apply the [`ScopePredicate`] verbatim.
#[async_trait]
pub trait WorkOrderRepository: Send + Sync + 'static {
    async fn list(
        &self,
        scope: &ScopePredicate,
        filter: &WorkOrderFilter,
    ) -> Result<Vec<WorkOrder>, StoreError>;

    async fn create(&self, work_order: WorkOrder) -> Result<WorkOrder, StoreError>;

    /// Whether customer, site and asset form one ownership chain inside the provider.
    async fn check_ownership(
        &self,
        service_provider_id: &ServiceProviderId,
        customer_id: &CustomerId,
        site_id: &SiteId,
        asset_id: &AssetId,
    ) -> Result<bool, StoreError>;

    /// Complete a non-cancelled work order inside the scope.
    async fn complete(
        &self,
        scope: &ScopePredicate,
        id: &WorkOrderId,
        notes: Option<String>,
        completed_at: DateTime<Utc>,
    ) -> Result<MutationOutcome, StoreError>;

    /// Assign an open work order inside the scope.
    async fn assign(
        &self,
        scope: &ScopePredicate,
        id: &WorkOrderId,
        technician_id: &IdentityId,
    ) -> Result<MutationOutcome, StoreError>;
}
