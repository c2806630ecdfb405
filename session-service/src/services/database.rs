//! PostgreSQL adapter for the user and refresh-token collaborators.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPool;
use uuid::Uuid;

use crate::models::{RefreshToken, UserIdentity};
use crate::services::{RefreshStore, ServiceError, UserStore};

/// PostgreSQL database wrapper.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Create a new database wrapper from a connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Health check - ping the database.
    pub async fn health_check(&self) -> Result<(), ServiceError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Database health check failed: {}", e);
                ServiceError::Database(e)
            })?;
        Ok(())
    }
}

fn map_unique_violation(err: sqlx::Error) -> ServiceError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            ServiceError::EmailAlreadyRegistered
        }
        _ => ServiceError::Database(err),
    }
}

#[async_trait]
impl UserStore for Database {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserIdentity>, ServiceError> {
        let user = sqlx::query_as::<_, UserIdentity>(
            "SELECT * FROM users WHERE LOWER(email) = LOWER($1)",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserIdentity>, ServiceError> {
        let user = sqlx::query_as::<_, UserIdentity>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn insert(&self, user: &UserIdentity) -> Result<(), ServiceError> {
        sqlx::query(
            r#"
            INSERT INTO users (id, email, hashed_password, privileged, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.hashed_password)
        .bind(user.privileged)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_unique_violation)?;
        Ok(())
    }

    async fn update_credentials(
        &self,
        id: Uuid,
        email: &str,
        hashed_password: &str,
    ) -> Result<Option<UserIdentity>, ServiceError> {
        sqlx::query_as::<_, UserIdentity>(
            r#"
            UPDATE users
            SET email = $2, hashed_password = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(email)
        .bind(hashed_password)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_unique_violation)
    }

    async fn set_privileged(
        &self,
        id: Uuid,
        privileged: bool,
    ) -> Result<Option<UserIdentity>, ServiceError> {
        let user = sqlx::query_as::<_, UserIdentity>(
            r#"
            UPDATE users
            SET privileged = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(privileged)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }
}

#[async_trait]
impl RefreshStore for Database {
    async fn put(&self, token: &RefreshToken) -> Result<(), ServiceError> {
        sqlx::query(
            r#"
            INSERT INTO refresh_tokens (token, user_id, expires_at, revoked_at, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(&token.token)
        .bind(token.user_id)
        .bind(token.expires_at)
        .bind(token.revoked_at)
        .bind(token.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get(&self, token: &str) -> Result<Option<RefreshToken>, ServiceError> {
        let record =
            sqlx::query_as::<_, RefreshToken>("SELECT * FROM refresh_tokens WHERE token = $1")
                .bind(token)
                .fetch_optional(&self.pool)
                .await?;
        Ok(record)
    }

    async fn revoke(&self, token: &str, at: DateTime<Utc>) -> Result<bool, ServiceError> {
        // Single statement: the row lock makes set-once revocation atomic.
        let result = sqlx::query(
            "UPDATE refresh_tokens SET revoked_at = COALESCE(revoked_at, $2) WHERE token = $1",
        )
        .bind(token)
        .bind(at)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
