//! PostgreSQL refresh and verification session repositories

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::table::{PgTable, SESSION_COLUMNS};
use crate::error::DbResult;
use crate::models::{RefreshSessionRow, VerificationSessionRow};
use crate::repo::{CreateRefreshSession, RefreshSessionRepository, VerificationSessionRepository};

/// PostgreSQL refresh session repository
#[derive(Clone)]
pub struct PgRefreshSessionRepository {
    table: PgTable<RefreshSessionRow>,
}

impl PgRefreshSessionRepository {
    /// Create a new refresh session repository
    pub fn new(pool: PgPool) -> Self {
        Self {
            table: PgTable::new(pool),
        }
    }
}

#[async_trait]
impl RefreshSessionRepository for PgRefreshSessionRepository {
    async fn create(&self, session: CreateRefreshSession) -> DbResult<RefreshSessionRow> {
        let sql = format!(
            "INSERT INTO refresh_sessions (id, user_id, token_hash, expires_in) \
             VALUES ($1, $2, $3, $4) RETURNING {SESSION_COLUMNS}"
        );
        let row = sqlx::query_as::<_, RefreshSessionRow>(&sql)
            .bind(session.id)
            .bind(session.user_id)
            .bind(&session.token_hash)
            .bind(session.expires_in)
            .fetch_one(self.table.pool())
            .await?;

        Ok(row)
    }

    async fn find_by_token_hash(&self, token_hash: &str) -> DbResult<Option<RefreshSessionRow>> {
        let sql = format!("SELECT {SESSION_COLUMNS} FROM refresh_sessions WHERE token_hash = $1");
        let row = sqlx::query_as::<_, RefreshSessionRow>(&sql)
            .bind(token_hash)
            .fetch_optional(self.table.pool())
            .await?;

        Ok(row)
    }

    async fn find_by_user_id(&self, user_id: Uuid) -> DbResult<Vec<RefreshSessionRow>> {
        let sql = format!(
            "SELECT {SESSION_COLUMNS} FROM refresh_sessions WHERE user_id = $1 \
             ORDER BY created_at DESC"
        );
        let rows = sqlx::query_as::<_, RefreshSessionRow>(&sql)
            .bind(user_id)
            .fetch_all(self.table.pool())
            .await?;

        Ok(rows)
    }

    async fn rotate(
        &self,
        id: Uuid,
        old_token_hash: &str,
        new_token_hash: &str,
        expires_in: i64,
        now: DateTime<Utc>,
    ) -> DbResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE refresh_sessions
            SET token_hash = $3, expires_in = $4, created_at = $5
            WHERE id = $1 AND token_hash = $2
            "#,
        )
        .bind(id)
        .bind(old_token_hash)
        .bind(new_token_hash)
        .bind(expires_in)
        .bind(now)
        .execute(self.table.pool())
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: Uuid) -> DbResult<bool> {
        self.table.delete_by_id(id).await
    }

    async fn delete_by_token_hash(&self, token_hash: &str) -> DbResult<bool> {
        let result = sqlx::query("DELETE FROM refresh_sessions WHERE token_hash = $1")
            .bind(token_hash)
            .execute(self.table.pool())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_expired(&self) -> DbResult<u64> {
        let result = sqlx::query(
            "DELETE FROM refresh_sessions \
             WHERE created_at + expires_in * INTERVAL '1 second' <= NOW()",
        )
        .execute(self.table.pool())
        .await?;

        tracing::debug!(deleted = result.rows_affected(), "expired refresh sessions deleted");
        Ok(result.rows_affected())
    }
}

/// PostgreSQL email verification session repository
#[derive(Clone)]
pub struct PgVerificationSessionRepository {
    table: PgTable<VerificationSessionRow>,
}

impl PgVerificationSessionRepository {
    /// Create a new verification session repository
    pub fn new(pool: PgPool) -> Self {
        Self {
            table: PgTable::new(pool),
        }
    }
}

#[async_trait]
impl VerificationSessionRepository for PgVerificationSessionRepository {
    async fn find_by_token_hash(
        &self,
        token_hash: &str,
    ) -> DbResult<Option<VerificationSessionRow>> {
        let sql =
            format!("SELECT {SESSION_COLUMNS} FROM verification_sessions WHERE token_hash = $1");
        let row = sqlx::query_as::<_, VerificationSessionRow>(&sql)
            .bind(token_hash)
            .fetch_optional(self.table.pool())
            .await?;

        Ok(row)
    }

    async fn confirm(&self, session_id: Uuid, user_id: Uuid) -> DbResult<bool> {
        let mut tx = self.table.pool().begin().await?;

        let deleted = sqlx::query("DELETE FROM verification_sessions WHERE id = $1")
            .bind(session_id)
            .execute(&mut *tx)
            .await?;
        if deleted.rows_affected() == 0 {
            return Ok(false);
        }

        sqlx::query("UPDATE users SET is_verified = TRUE WHERE id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(true)
    }

    async fn purge(&self, session_id: Uuid, user_id: Uuid) -> DbResult<()> {
        let mut tx = self.table.pool().begin().await?;

        sqlx::query("DELETE FROM verification_sessions WHERE id = $1")
            .bind(session_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM users WHERE id = $1 AND NOT is_verified")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn purge_expired(&self) -> DbResult<u64> {
        let result = sqlx::query(
            r#"
            WITH expired AS (
                DELETE FROM verification_sessions
                WHERE created_at + expires_in * INTERVAL '1 second' <= NOW()
                RETURNING user_id
            )
            DELETE FROM users
            WHERE id IN (SELECT user_id FROM expired) AND NOT is_verified
            "#,
        )
        .execute(self.table.pool())
        .await?;

        tracing::debug!(purged = result.rows_affected(), "unverified users purged");
        Ok(result.rows_affected())
    }
}
