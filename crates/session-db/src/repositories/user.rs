//! PostgreSQL implementation of UserRepository

use async_trait::async_trait;
use sqlx::PgPool;
use std::time::Duration;
use tracing::instrument;

use session_core::{RepoResult, SubjectId, User, UserRepository};

use crate::models::UserModel;

use super::error::bounded;

/// PostgreSQL implementation of UserRepository
#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
    operation_timeout: Duration,
}

impl PgUserRepository {
    /// Create a new PgUserRepository
    pub fn new(pool: PgPool, operation_timeout: Duration) -> Self {
        Self {
            pool,
            operation_timeout,
        }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: SubjectId) -> RepoResult<Option<User>> {
        let result = bounded(
            self.operation_timeout,
            sqlx::query_as::<_, UserModel>(
                r"
                SELECT id, email, password_hash, created_at
                FROM users
                WHERE id = $1
                ",
            )
            .bind(id.into_inner())
            .fetch_optional(&self.pool),
        )
        .await?;

        Ok(result.map(User::from))
    }

    #[instrument(skip(self))]
    async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        let result = bounded(
            self.operation_timeout,
            sqlx::query_as::<_, UserModel>(
                r"
                SELECT id, email, password_hash, created_at
                FROM users
                WHERE email = $1
                ",
            )
            .bind(email)
            .fetch_optional(&self.pool),
        )
        .await?;

        Ok(result.map(User::from))
    }

    #[instrument(skip_all, fields(id = %user.id))]
    async fn create(&self, user: &User) -> RepoResult<()> {
        bounded(
            self.operation_timeout,
            sqlx::query(
                r"
                INSERT INTO users (id, email, password_hash, created_at)
                VALUES ($1, $2, $3, $4)
                ",
            )
            .bind(user.id.into_inner())
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(user.created_at)
            .execute(&self.pool),
        )
        .await?;

        Ok(())
    }
}
