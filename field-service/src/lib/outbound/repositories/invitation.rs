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
use crate::domain::ids::IdentityId;
use crate::domain::ids::InvitationId;
use crate::domain::ids::ServiceProviderId;
use crate::domain::invitation::models::Invitation;
use crate::domain::invitation::ports::InvitationRepository;

pub struct PostgresInvitationRepository {
    pool: PgPool,
    timeout: Duration,
}

impl PostgresInvitationRepository {
    pub fn new(pool: PgPool, timeout: Duration) -> Self {
        Self { pool, timeout }
    }

    /// Conditional consume plus password replacement in one transaction.
    ///
    /// Dropping the returned future before commit rolls the transaction back.
    async fn consume_in_transaction(
        &self,
        invitation_id: &InvitationId,
        identity_id: &IdentityId,
        password_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<bool, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let consumed = sqlx::query(
            r#"
            UPDATE invitations
            SET consumed_at = $3
            WHERE id = $1
              AND identity_id = $2
              AND consumed_at IS NULL
              AND expires_at > $3
            "#,
        )
        .bind(invitation_id.0)
        .bind(identity_id.0)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        if consumed.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        let activated = sqlx::query("UPDATE identities SET password_hash = $2 WHERE id = $1")
            .bind(identity_id.0)
            .bind(password_hash)
            .execute(&mut *tx)
            .await?;

        if activated.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        tx.commit().await?;
        Ok(true)
    }
}

#[derive(Debug, FromRow)]
struct InvitationRow {
    id: Uuid,
    service_provider_id: Uuid,
    identity_id: Uuid,
    token_hash: String,
    expires_at: DateTime<Utc>,
    consumed_at: Option<DateTime<Utc>>,
    created_by: Uuid,
    created_at: DateTime<Utc>,
}

impl From<InvitationRow> for Invitation {
    fn from(row: InvitationRow) -> Self {
        Self {
            id: InvitationId(row.id),
            service_provider_id: ServiceProviderId(row.service_provider_id),
            identity_id: IdentityId(row.identity_id),
            token_hash: row.token_hash,
            expires_at: row.expires_at,
            consumed_at: row.consumed_at,
            created_by: IdentityId(row.created_by),
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl InvitationRepository for PostgresInvitationRepository {
    async fn create(&self, invitation: Invitation) -> Result<Invitation, StoreError> {
        bounded(
            self.timeout,
            sqlx::query(
                r#"
                INSERT INTO invitations
                    (id, service_provider_id, identity_id, token_hash,
                     expires_at, consumed_at, created_by, created_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                "#,
            )
            .bind(invitation.id.0)
            .bind(invitation.service_provider_id.0)
            .bind(invitation.identity_id.0)
            .bind(&invitation.token_hash)
            .bind(invitation.expires_at)
            .bind(invitation.consumed_at)
            .bind(invitation.created_by.0)
            .bind(invitation.created_at)
            .execute(&self.pool),
        )
        .await?;

        Ok(invitation)
    }

    async fn find_usable_by_token_hash(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Invitation>, StoreError> {
        let pool = &self.pool;

        let row = read_with_retry(self.timeout, || {
            sqlx::query_as::<_, InvitationRow>(
                r#"
                SELECT id, service_provider_id, identity_id, token_hash,
                       expires_at, consumed_at, created_by, created_at
                FROM invitations
                WHERE token_hash = $1
                  AND consumed_at IS NULL
                  AND expires_at > $2
                LIMIT 1
                "#,
            )
            .bind(token_hash)
            .bind(now)
            .fetch_optional(pool)
        })
        .await?;

        Ok(row.map(Invitation::from))
    }

    async fn consume(
        &self,
        invitation_id: &InvitationId,
        identity_id: &IdentityId,
        password_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        bounded(
            self.timeout,
            self.consume_in_transaction(invitation_id, identity_id, password_hash, now),
        )
        .await
    }
}
