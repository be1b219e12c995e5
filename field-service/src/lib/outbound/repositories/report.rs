use std::time::Duration;

use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use sqlx::FromRow;
use sqlx::PgPool;
use sqlx::Postgres;
use sqlx::QueryBuilder;
use uuid::Uuid;

use super::push_scope;
use super::read_with_retry;
use crate::domain::authorization::models::ScopePredicate;
use crate::domain::errors::StoreError;
use crate::domain::ids::CustomerId;
use crate::domain::ids::ServiceProviderId;
use crate::domain::ids::WorkOrderId;
use crate::domain::report::models::ReportEntry;
use crate::domain::report::models::ReportHeader;
use crate::domain::report::ports::ReportRepository;
use crate::domain::work_order::errors::UnknownValueError;

pub struct PostgresReportRepository {
    pool: PgPool,
    timeout: Duration,
}

impl PostgresReportRepository {
    pub fn new(pool: PgPool, timeout: Duration) -> Self {
        Self { pool, timeout }
    }
}

#[derive(Debug, FromRow)]
struct HeaderRow {
    service_provider_name: String,
    customer_name: String,
}

#[derive(Debug, FromRow)]
struct EntryRow {
    id: Uuid,
    completed_at: DateTime<Utc>,
    site_name: String,
    tag_code: String,
    asset_name: Option<String>,
    work_order_type: String,
    priority: String,
    title: String,
}

impl TryFrom<EntryRow> for ReportEntry {
    type Error = StoreError;

    fn try_from(row: EntryRow) -> Result<Self, Self::Error> {
        let corrupt = |e: UnknownValueError| {
            StoreError::Corrupt(format!("work order {}: {}", row.id, e))
        };

        Ok(ReportEntry {
            work_order_id: WorkOrderId(row.id),
            completed_at: row.completed_at,
            site_name: row.site_name,
            asset_tag: row.tag_code,
            asset_name: row.asset_name,
            work_order_type: row.work_order_type.parse().map_err(corrupt)?,
            priority: row.priority.parse().map_err(corrupt)?,
            title: row.title,
        })
    }
}

#[async_trait]
impl ReportRepository for PostgresReportRepository {
    async fn report_header(
        &self,
        service_provider_id: &ServiceProviderId,
        customer_id: &CustomerId,
    ) -> Result<Option<ReportHeader>, StoreError> {
        let pool = &self.pool;

        let row = read_with_retry(self.timeout, || {
            sqlx::query_as::<_, HeaderRow>(
                r#"
                SELECT sp.name AS service_provider_name, c.name AS customer_name
                FROM service_providers sp
                JOIN customers c ON c.service_provider_id = sp.id
                WHERE sp.id = $1 AND c.id = $2
                "#,
            )
            .bind(service_provider_id.0)
            .bind(customer_id.0)
            .fetch_optional(pool)
        })
        .await?;

        Ok(row.map(|r| ReportHeader {
            service_provider_name: r.service_provider_name,
            customer_name: r.customer_name,
        }))
    }

    async fn completed_in_window(
        &self,
        scope: &ScopePredicate,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<ReportEntry>, StoreError> {
        let scope = *scope;
        let pool = &self.pool;

        let rows = read_with_retry(self.timeout, || async move {
            let mut builder = QueryBuilder::<Postgres>::new(
                r#"
                SELECT wo.id, wo.completed_at, s.name AS site_name, a.tag_code,
                       a.name AS asset_name, wo.work_order_type, wo.priority, wo.title
                FROM work_orders wo
                JOIN sites s ON s.id = wo.site_id
                JOIN assets a ON a.id = wo.asset_id
                WHERE wo.status = 'completed'
                "#,
            );
            push_scope(&mut builder, &scope, "wo");
            builder
                .push(" AND wo.completed_at >= ")
                .push_bind(from)
                .push(" AND wo.completed_at < ")
                .push_bind(to)
                .push(" ORDER BY wo.completed_at ASC, wo.id ASC");

            builder
                .build_query_as::<EntryRow>()
                .fetch_all(pool)
                .await
        })
        .await?;

        rows.into_iter().map(ReportEntry::try_from).collect()
    }
}
