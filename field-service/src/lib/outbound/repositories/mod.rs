//! Store adapters.
//!
//! Every Postgres call is bounded by the configured operation timeout.
//! Idempotent reads go through [`read_with_retry`]; writes use [`bounded`]
//! and are never retried.

use std::future::Future;
use std::time::Duration;

use sqlx::Postgres;
use sqlx::QueryBuilder;

use crate::domain::authorization::models::ScopePredicate;
use crate::domain::errors::StoreError;

pub mod identity;
pub mod invitation;
pub mod memory;
pub mod report;
pub mod work_order;

pub use identity::PostgresIdentityRepository;
pub use invitation::PostgresInvitationRepository;
pub use memory::InMemoryStore;
pub use report::PostgresReportRepository;
pub use work_order::PostgresWorkOrderRepository;

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut => StoreError::Timeout,
            sqlx::Error::Io(_) | sqlx::Error::PoolClosed | sqlx::Error::WorkerCrashed => {
                StoreError::Unavailable(err.to_string())
            }
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                StoreError::UniqueViolation(db_err.constraint().unwrap_or("unique").to_string())
            }
            sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => {
                StoreError::Corrupt(err.to_string())
            }
            _ => StoreError::Database(err.to_string()),
        }
    }
}

/// Run one store operation under a deadline.
pub(crate) async fn bounded<T, F>(timeout: Duration, operation: F) -> Result<T, StoreError>
where
    F: Future<Output = Result<T, sqlx::Error>>,
{
    match tokio::time::timeout(timeout, operation).await {
        Ok(result) => result.map_err(StoreError::from),
        Err(_) => Err(StoreError::Timeout),
    }
}

/// Run an idempotent read, retrying once on a transient failure.
pub(crate) async fn read_with_retry<T, F, Fut>(
    timeout: Duration,
    operation: F,
) -> Result<T, StoreError>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, sqlx::Error>>,
{
    match bounded(timeout, operation()).await {
        Err(e) if e.is_transient() => {
            tracing::warn!(error = %e, "Store read failed, retrying once");
            bounded(timeout, operation()).await
        }
        result => result,
    }
}

/// Append the scope predicate as `AND` clauses on columns of `table`.
pub(crate) fn push_scope(
    builder: &mut QueryBuilder<'static, Postgres>,
    scope: &ScopePredicate,
    table: &str,
) {
    builder
        .push(format!(" AND {}.service_provider_id = ", table))
        .push_bind(scope.service_provider_id().0);
    if let Some(customer_id) = scope.customer_id() {
        builder
            .push(format!(" AND {}.customer_id = ", table))
            .push_bind(customer_id.0);
    }
    if let Some(assignee) = scope.assignee() {
        builder
            .push(format!(" AND {}.assigned_to = ", table))
            .push_bind(assignee.0);
    }
}
