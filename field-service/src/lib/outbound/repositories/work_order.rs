use std::time::Duration;

use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use sqlx::FromRow;
use sqlx::PgPool;
use sqlx::Postgres;
use sqlx::QueryBuilder;
use uuid::Uuid;

use super::bounded;
use super::push_scope;
use super::read_with_retry;
use crate::domain::authorization::models::ScopePredicate;
use crate::domain::errors::StoreError;
use crate::domain::ids::AssetId;
use crate::domain::ids::CustomerId;
use crate::domain::ids::IdentityId;
use crate::domain::ids::ServiceProviderId;
use crate::domain::ids::SiteId;
use crate::domain::ids::WorkOrderId;
use crate::domain::work_order::errors::UnknownValueError;
use crate::domain::work_order::models::MutationOutcome;
use crate::domain::work_order::models::WorkOrder;
use crate::domain::work_order::models::WorkOrderFilter;
use crate::domain::work_order::models::WorkOrderStatus;
use crate::domain::work_order::ports::WorkOrderRepository;

const WORK_ORDER_COLUMNS: &str = "wo.id, wo.service_provider_id, wo.customer_id, wo.site_id, \
     wo.asset_id, wo.work_order_type, wo.priority, wo.status, wo.title, wo.description, \
     wo.notes, wo.assigned_to, wo.created_by, wo.completed_at, wo.created_at";

pub struct PostgresWorkOrderRepository {
    pool: PgPool,
    timeout: Duration,
}

impl PostgresWorkOrderRepository {
    pub fn new(pool: PgPool, timeout: Duration) -> Self {
        Self { pool, timeout }
    }

    /// Distinguish "not in scope" from "in scope but in the wrong status"
    /// after a conditional update matched nothing.
    async fn explain_miss(
        &self,
        scope: &ScopePredicate,
        id: &WorkOrderId,
    ) -> Result<MutationOutcome, StoreError> {
        let scope = *scope;
        let id = id.0;
        let pool = &self.pool;

        let status = read_with_retry(self.timeout, || async move {
            let mut builder =
                QueryBuilder::<Postgres>::new("SELECT wo.status FROM work_orders wo WHERE wo.id = ");
            builder.push_bind(id);
            push_scope(&mut builder, &scope, "wo");
            builder
                .build_query_scalar::<String>()
                .fetch_optional(pool)
                .await
        })
        .await?;

        match status {
            Some(status) => status
                .parse()
                .map(MutationOutcome::Rejected)
                .map_err(|e: UnknownValueError| StoreError::Corrupt(e.to_string())),
            None => Ok(MutationOutcome::NotFound),
        }
    }

    /// Run a scoped `UPDATE ... RETURNING` and classify a miss.
    async fn conditional_update(
        &self,
        scope: &ScopePredicate,
        id: &WorkOrderId,
        mut builder: QueryBuilder<'static, Postgres>,
        status_guard: &str,
    ) -> Result<MutationOutcome, StoreError> {
        builder.push(" WHERE wo.id = ").push_bind(id.0);
        push_scope(&mut builder, scope, "wo");
        builder.push(status_guard);
        builder.push(" RETURNING ").push(WORK_ORDER_COLUMNS);

        let row = bounded(
            self.timeout,
            builder
                .build_query_as::<WorkOrderRow>()
                .fetch_optional(&self.pool),
        )
        .await?;

        match row {
            Some(row) => Ok(MutationOutcome::Applied(WorkOrder::try_from(row)?)),
            None => self.explain_miss(scope, id).await,
        }
    }
}

#[derive(Debug, FromRow)]
struct WorkOrderRow {
    id: Uuid,
    service_provider_id: Uuid,
    customer_id: Uuid,
    site_id: Uuid,
    asset_id: Uuid,
    work_order_type: String,
    priority: String,
    status: String,
    title: String,
    description: Option<String>,
    notes: Option<String>,
    assigned_to: Option<Uuid>,
    created_by: Uuid,
    completed_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl TryFrom<WorkOrderRow> for WorkOrder {
    type Error = StoreError;

    fn try_from(row: WorkOrderRow) -> Result<Self, Self::Error> {
        let corrupt = |e: UnknownValueError| {
            StoreError::Corrupt(format!("work order {}: {}", row.id, e))
        };

        Ok(WorkOrder {
            id: WorkOrderId(row.id),
            service_provider_id: ServiceProviderId(row.service_provider_id),
            customer_id: CustomerId(row.customer_id),
            site_id: SiteId(row.site_id),
            asset_id: AssetId(row.asset_id),
            work_order_type: row.work_order_type.parse().map_err(corrupt)?,
            priority: row.priority.parse().map_err(corrupt)?,
            status: row.status.parse().map_err(corrupt)?,
            title: row.title,
            description: row.description,
            notes: row.notes,
            assigned_to: row.assigned_to.map(IdentityId),
            created_by: IdentityId(row.created_by),
            completed_at: row.completed_at,
            created_at: row.created_at,
        })
    }
}

#[async_trait]
impl WorkOrderRepository for PostgresWorkOrderRepository {
    async fn list(
        &self,
        scope: &ScopePredicate,
        filter: &WorkOrderFilter,
    ) -> Result<Vec<WorkOrder>, StoreError> {
        let scope = *scope;
        let filter = *filter;
        let pool = &self.pool;

        let rows = read_with_retry(self.timeout, || async move {
            let mut builder = QueryBuilder::<Postgres>::new("SELECT ");
            builder.push(WORK_ORDER_COLUMNS);
            builder.push(" FROM work_orders wo WHERE TRUE");
            push_scope(&mut builder, &scope, "wo");
            if let Some(status) = filter.status {
                builder.push(" AND wo.status = ").push_bind(status.as_str());
            }
            builder
                .push(" ORDER BY wo.created_at DESC, wo.id DESC LIMIT ")
                .push_bind(i64::from(filter.limit))
                .push(" OFFSET ")
                .push_bind(i64::from(filter.offset));

            builder
                .build_query_as::<WorkOrderRow>()
                .fetch_all(pool)
                .await
        })
        .await?;

        rows.into_iter().map(WorkOrder::try_from).collect()
    }

    async fn create(&self, work_order: WorkOrder) -> Result<WorkOrder, StoreError> {
        bounded(
            self.timeout,
            sqlx::query(
                r#"
                INSERT INTO work_orders
                    (id, service_provider_id, customer_id, site_id, asset_id,
                     work_order_type, priority, status, title, description, notes,
                     assigned_to, created_by, completed_at, created_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
                "#,
            )
            .bind(work_order.id.0)
            .bind(work_order.service_provider_id.0)
            .bind(work_order.customer_id.0)
            .bind(work_order.site_id.0)
            .bind(work_order.asset_id.0)
            .bind(work_order.work_order_type.as_str())
            .bind(work_order.priority.as_str())
            .bind(work_order.status.as_str())
            .bind(&work_order.title)
            .bind(work_order.description.as_deref())
            .bind(work_order.notes.as_deref())
            .bind(work_order.assigned_to.map(|a| a.0))
            .bind(work_order.created_by.0)
            .bind(work_order.completed_at)
            .bind(work_order.created_at)
            .execute(&self.pool),
        )
        .await?;

        Ok(work_order)
    }

    async fn check_ownership(
        &self,
        service_provider_id: &ServiceProviderId,
        customer_id: &CustomerId,
        site_id: &SiteId,
        asset_id: &AssetId,
    ) -> Result<bool, StoreError> {
        let pool = &self.pool;

        read_with_retry(self.timeout, || {
            sqlx::query_scalar::<_, bool>(
                r#"
                SELECT EXISTS (
                    SELECT 1
                    FROM customers c
                    JOIN sites s ON s.customer_id = c.id
                    JOIN assets a ON a.site_id = s.id AND a.customer_id = c.id
                    WHERE c.service_provider_id = $1
                      AND c.id = $2
                      AND s.id = $3
                      AND a.id = $4
                )
                "#,
            )
            .bind(service_provider_id.0)
            .bind(customer_id.0)
            .bind(site_id.0)
            .bind(asset_id.0)
            .fetch_one(pool)
        })
        .await
    }

    async fn complete(
        &self,
        scope: &ScopePredicate,
        id: &WorkOrderId,
        notes: Option<String>,
        completed_at: DateTime<Utc>,
    ) -> Result<MutationOutcome, StoreError> {
        let mut builder = QueryBuilder::<Postgres>::new(
            "UPDATE work_orders wo SET status = 'completed', completed_at = COALESCE(wo.completed_at, ",
        );
        builder.push_bind(completed_at);
        builder.push("), notes = COALESCE(");
        builder.push_bind(notes);
        builder.push(", wo.notes)");

        let guard = format!(" AND wo.status <> '{}'", WorkOrderStatus::Cancelled);
        self.conditional_update(scope, id, builder, &guard).await
    }

    async fn assign(
        &self,
        scope: &ScopePredicate,
        id: &WorkOrderId,
        technician_id: &IdentityId,
    ) -> Result<MutationOutcome, StoreError> {
        let mut builder = QueryBuilder::<Postgres>::new("UPDATE work_orders wo SET assigned_to = ");
        builder.push_bind(technician_id.0);

        let guard = format!(" AND wo.status = '{}'", WorkOrderStatus::Open);
        self.conditional_update(scope, id, builder, &guard).await
    }
}
