//! PostgreSQL implementation of SessionStore
//!
//! Every state transition is a single conditional UPDATE so that of any set
//! of concurrent callers targeting the same ACTIVE row, exactly one observes
//! `rows_affected() == 1`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgExecutor, PgPool};
use std::time::Duration;
use tracing::instrument;

use session_core::{
    DenylistedCredential, FamilyId, PurgeReport, RefreshToken, RevocationReason, SessionStore,
    StoreResult, SubjectId,
};

use crate::mappers::RefreshTokenInsert;
use crate::models::RefreshTokenModel;

use super::error::bounded;

/// PostgreSQL implementation of SessionStore
#[derive(Clone)]
pub struct PgSessionStore {
    pool: PgPool,
    operation_timeout: Duration,
}

impl PgSessionStore {
    /// Create a new PgSessionStore; each call is bounded by `operation_timeout`
    pub fn new(pool: PgPool, operation_timeout: Duration) -> Self {
        Self {
            pool,
            operation_timeout,
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

async fn insert_refresh_token<'e, E>(executor: E, token: &RefreshToken) -> Result<(), sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let row = RefreshTokenInsert::new(token);
    sqlx::query(
        r"
        INSERT INTO refresh_tokens (id, subject_id, subject_email, token, family_id, issued_at,
                                    expires_at, revoked, revoked_at, revocation_reason, replaced_by)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        ",
    )
    .bind(row.id)
    .bind(row.subject_id)
    .bind(row.subject_email)
    .bind(row.token)
    .bind(row.family_id)
    .bind(row.issued_at)
    .bind(row.expires_at)
    .bind(row.revoked)
    .bind(row.revoked_at)
    .bind(row.revocation_reason)
    .bind(row.replaced_by)
    .execute(executor)
    .await?;

    Ok(())
}

#[async_trait]
impl SessionStore for PgSessionStore {
    #[instrument(skip_all, fields(subject_id = %token.subject_id, family_id = %token.family_id))]
    async fn create_refresh_token(&self, token: &RefreshToken) -> StoreResult<()> {
        bounded(self.operation_timeout, insert_refresh_token(&self.pool, token)).await
    }

    #[instrument(skip_all)]
    async fn find_refresh_token(&self, token: &str) -> StoreResult<Option<RefreshToken>> {
        let result = bounded(
            self.operation_timeout,
            sqlx::query_as::<_, RefreshTokenModel>(
                r"
                SELECT id, subject_id, subject_email, token, family_id, issued_at, expires_at,
                       revoked, revoked_at, revocation_reason, replaced_by
                FROM refresh_tokens
                WHERE token = $1
                ",
            )
            .bind(token)
            .fetch_optional(&self.pool),
        )
        .await?;

        Ok(result.map(RefreshToken::from))
    }

    #[instrument(skip(self))]
    async fn find_refresh_tokens_by_subject(
        &self,
        subject_id: SubjectId,
    ) -> StoreResult<Vec<RefreshToken>> {
        let rows = bounded(
            self.operation_timeout,
            sqlx::query_as::<_, RefreshTokenModel>(
                r"
                SELECT id, subject_id, subject_email, token, family_id, issued_at, expires_at,
                       revoked, revoked_at, revocation_reason, replaced_by
                FROM refresh_tokens
                WHERE subject_id = $1
                ORDER BY issued_at DESC
                ",
            )
            .bind(subject_id.into_inner())
            .fetch_all(&self.pool),
        )
        .await?;

        Ok(rows.into_iter().map(RefreshToken::from).collect())
    }

    #[instrument(skip_all, fields(id = %token.id))]
    async fn update_refresh_token(&self, token: &RefreshToken) -> StoreResult<bool> {
        let row = RefreshTokenInsert::new(token);
        let result = bounded(
            self.operation_timeout,
            sqlx::query(
                r"
                UPDATE refresh_tokens
                SET subject_email = $2, expires_at = $3, revoked = $4, revoked_at = $5,
                    revocation_reason = $6, replaced_by = $7
                WHERE id = $1
                ",
            )
            .bind(row.id)
            .bind(row.subject_email)
            .bind(row.expires_at)
            .bind(row.revoked)
            .bind(row.revoked_at)
            .bind(row.revocation_reason)
            .bind(row.replaced_by)
            .execute(&self.pool),
        )
        .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip_all, fields(family_id = %successor.family_id))]
    async fn rotate_refresh_token(
        &self,
        presented: &str,
        successor: &RefreshToken,
        now: DateTime<Utc>,
    ) -> StoreResult<bool> {
        bounded(self.operation_timeout, async {
            let mut tx = self.pool.begin().await?;

            // Concurrent rotations of the same row serialize on the row lock;
            // the loser re-evaluates the predicate and matches nothing.
            let superseded = sqlx::query(
                r"
                UPDATE refresh_tokens
                SET revoked = TRUE, revoked_at = $2, revocation_reason = $3, replaced_by = $4
                WHERE token = $1 AND revoked = FALSE AND expires_at > $2
                ",
            )
            .bind(presented)
            .bind(now)
            .bind(RevocationReason::Rotated.as_str())
            .bind(&successor.token)
            .execute(&mut *tx)
            .await?
            .rows_affected();

            if superseded == 0 {
                tx.rollback().await?;
                return Ok::<_, sqlx::Error>(false);
            }

            insert_refresh_token(&mut *tx, successor).await?;
            tx.commit().await?;
            Ok(true)
        })
        .await
    }

    #[instrument(skip(self, token))]
    async fn revoke_refresh_token(
        &self,
        token: &str,
        reason: RevocationReason,
        now: DateTime<Utc>,
    ) -> StoreResult<bool> {
        let result = bounded(
            self.operation_timeout,
            sqlx::query(
                r"
                UPDATE refresh_tokens
                SET revoked = TRUE, revoked_at = $2, revocation_reason = $3
                WHERE token = $1 AND revoked = FALSE
                ",
            )
            .bind(token)
            .bind(now)
            .bind(reason.as_str())
            .execute(&self.pool),
        )
        .await?;

        Ok(result.rows_affected() == 1)
    }

    #[instrument(skip(self))]
    async fn revoke_family(&self, family_id: &FamilyId, now: DateTime<Utc>) -> StoreResult<u64> {
        let result = bounded(
            self.operation_timeout,
            sqlx::query(
                r"
                UPDATE refresh_tokens
                SET revoked = TRUE, revoked_at = $2, revocation_reason = $3
                WHERE family_id = $1 AND revoked = FALSE
                ",
            )
            .bind(family_id.as_str())
            .bind(now)
            .bind(RevocationReason::FamilyRevoked.as_str())
            .execute(&self.pool),
        )
        .await?;

        Ok(result.rows_affected())
    }

    #[instrument(skip(self))]
    async fn revoke_subject(&self, subject_id: SubjectId, now: DateTime<Utc>) -> StoreResult<u64> {
        let result = bounded(
            self.operation_timeout,
            sqlx::query(
                r"
                UPDATE refresh_tokens
                SET revoked = TRUE, revoked_at = $2, revocation_reason = $3
                WHERE subject_id = $1 AND revoked = FALSE
                ",
            )
            .bind(subject_id.into_inner())
            .bind(now)
            .bind(RevocationReason::SubjectRevoked.as_str())
            .execute(&self.pool),
        )
        .await?;

        Ok(result.rows_affected())
    }

    #[instrument(skip_all, fields(expires_at = %entry.expires_at))]
    async fn add_to_denylist(&self, entry: &DenylistedCredential) -> StoreResult<()> {
        bounded(
            self.operation_timeout,
            sqlx::query(
                r"
                INSERT INTO access_denylist (credential, expires_at)
                VALUES ($1, $2)
                ON CONFLICT (credential) DO NOTHING
                ",
            )
            .bind(&entry.credential)
            .bind(entry.expires_at)
            .execute(&self.pool),
        )
        .await?;

        Ok(())
    }

    #[instrument(skip(self, credential))]
    async fn is_denylisted(&self, credential: &str, now: DateTime<Utc>) -> StoreResult<bool> {
        bounded(
            self.operation_timeout,
            sqlx::query_scalar::<_, bool>(
                r"
                SELECT EXISTS(
                    SELECT 1 FROM access_denylist WHERE credential = $1 AND expires_at > $2
                )
                ",
            )
            .bind(credential)
            .bind(now)
            .fetch_one(&self.pool),
        )
        .await
    }

    #[instrument(skip(self))]
    async fn purge_expired(&self, now: DateTime<Utc>) -> StoreResult<PurgeReport> {
        bounded(self.operation_timeout, async {
            let refresh_tokens = sqlx::query("DELETE FROM refresh_tokens WHERE expires_at <= $1")
                .bind(now)
                .execute(&self.pool)
                .await?
                .rows_affected();

            let denylist = sqlx::query("DELETE FROM access_denylist WHERE expires_at <= $1")
                .bind(now)
                .execute(&self.pool)
                .await?
                .rows_affected();

            Ok::<_, sqlx::Error>(PurgeReport {
                refresh_tokens,
                denylist,
            })
        })
        .await
    }

    #[instrument(skip(self))]
    async fn health_check(&self) -> StoreResult<()> {
        bounded(
            self.operation_timeout,
            sqlx::query_scalar::<_, i32>("SELECT 1").fetch_one(&self.pool),
        )
        .await?;

        Ok(())
    }
}
