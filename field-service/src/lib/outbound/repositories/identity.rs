use std::time::Duration;

use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use sqlx::FromRow;
use sqlx::PgPool;
use uuid::Uuid;

use super::bounded;
use super::read_with_retry;
use crate::domain::errors::StoreError;
use crate::domain::identity::models::EmailAddress;
use crate::domain::identity::models::FullName;
use crate::domain::identity::models::Identity;
use crate::domain::identity::models::PasswordState;
use crate::domain::identity::models::Role;
use crate::domain::identity::ports::IdentityRepository;
use crate::domain::ids::CustomerId;
use crate::domain::ids::IdentityId;
use crate::domain::ids::ServiceProviderId;

pub(crate) const IDENTITY_COLUMNS: &str = "id, service_provider_id, customer_id, full_name, email, \
     phone_number, role, active, password_hash, created_at";

pub struct PostgresIdentityRepository {
    pool: PgPool,
    timeout: Duration,
}

impl PostgresIdentityRepository {
    pub fn new(pool: PgPool, timeout: Duration) -> Self {
        Self { pool, timeout }
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct IdentityRow {
    id: Uuid,
    service_provider_id: Uuid,
    customer_id: Option<Uuid>,
    full_name: String,
    email: String,
    phone_number: Option<String>,
    role: String,
    active: bool,
    password_hash: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<IdentityRow> for Identity {
    type Error = StoreError;

    fn try_from(row: IdentityRow) -> Result<Self, Self::Error> {
        let corrupt = |field: &str, reason: String| {
            StoreError::Corrupt(format!("identity {} {}: {}", row.id, field, reason))
        };

        Ok(Identity {
            id: IdentityId(row.id),
            service_provider_id: ServiceProviderId(row.service_provider_id),
            customer_id: row.customer_id.map(CustomerId),
            full_name: FullName::new(&row.full_name)
                .map_err(|e| corrupt("full_name", e.to_string()))?,
            email: EmailAddress::new(&row.email).map_err(|e| corrupt("email", e.to_string()))?,
            phone_number: row.phone_number,
            role: row
                .role
                .parse::<Role>()
                .map_err(|e| corrupt("role", e.to_string()))?,
            active: row.active,
            password: PasswordState::from_stored(row.password_hash),
            created_at: row.created_at,
        })
    }
}

#[async_trait]
impl IdentityRepository for PostgresIdentityRepository {
    async fn find_by_tenant_and_email(
        &self,
        service_provider_id: &ServiceProviderId,
        email: &EmailAddress,
    ) -> Result<Option<Identity>, StoreError> {
        let sql = format!(
            "SELECT {} FROM identities WHERE service_provider_id = $1 AND email = $2",
            IDENTITY_COLUMNS
        );
        let pool = &self.pool;

        let row = read_with_retry(self.timeout, || {
            sqlx::query_as::<_, IdentityRow>(&sql)
                .bind(service_provider_id.0)
                .bind(email.as_str())
                .fetch_optional(pool)
        })
        .await?;

        row.map(Identity::try_from).transpose()
    }

    async fn find_by_id(&self, id: &IdentityId) -> Result<Option<Identity>, StoreError> {
        let sql = format!("SELECT {} FROM identities WHERE id = $1", IDENTITY_COLUMNS);
        let pool = &self.pool;

        let row = read_with_retry(self.timeout, || {
            sqlx::query_as::<_, IdentityRow>(&sql)
                .bind(id.0)
                .fetch_optional(pool)
        })
        .await?;

        row.map(Identity::try_from).transpose()
    }

    async fn create(&self, identity: Identity) -> Result<Identity, StoreError> {
        bounded(
            self.timeout,
            sqlx::query(
                r#"
                INSERT INTO identities
                    (id, service_provider_id, customer_id, full_name, email,
                     phone_number, role, active, password_hash, created_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
                "#,
            )
            .bind(identity.id.0)
            .bind(identity.service_provider_id.0)
            .bind(identity.customer_id.map(|c| c.0))
            .bind(identity.full_name.as_str())
            .bind(identity.email.as_str())
            .bind(identity.phone_number.as_deref())
            .bind(identity.role.as_str())
            .bind(identity.active)
            .bind(identity.password.as_stored())
            .bind(identity.created_at)
            .execute(&self.pool),
        )
        .await?;

        Ok(identity)
    }

    async fn update_password(
        &self,
        id: &IdentityId,
        password_hash: &str,
    ) -> Result<bool, StoreError> {
        let result = bounded(
            self.timeout,
            sqlx::query("UPDATE identities SET password_hash = $2 WHERE id = $1")
                .bind(id.0)
                .bind(password_hash)
                .execute(&self.pool),
        )
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn set_active(
        &self,
        service_provider_id: &ServiceProviderId,
        id: &IdentityId,
        active: bool,
    ) -> Result<Option<Identity>, StoreError> {
        let sql = format!(
            "UPDATE identities SET active = $3 \
             WHERE service_provider_id = $1 AND id = $2 \
             RETURNING {}",
            IDENTITY_COLUMNS
        );

        let row = bounded(
            self.timeout,
            sqlx::query_as::<_, IdentityRow>(&sql)
                .bind(service_provider_id.0)
                .bind(id.0)
                .bind(active)
                .fetch_optional(&self.pool),
        )
        .await?;

        row.map(Identity::try_from).transpose()
    }

    async fn customer_in_provider(
        &self,
        service_provider_id: &ServiceProviderId,
        customer_id: &CustomerId,
    ) -> Result<bool, StoreError> {
        let pool = &self.pool;

        read_with_retry(self.timeout, || {
            sqlx::query_scalar::<_, bool>(
                "SELECT EXISTS (SELECT 1 FROM customers WHERE id = $2 AND service_provider_id = $1)",
            )
            .bind(service_provider_id.0)
            .bind(customer_id.0)
            .fetch_one(pool)
        })
        .await
    }
}
