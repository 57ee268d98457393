//! PostgreSQL follow edge repository

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::activity::insert_activity;
use crate::error::DbResult;
use crate::models::FollowProfileRow;
use crate::repo::{CreateActivity, FollowRepository};

/// PostgreSQL follow repository
#[derive(Clone)]
pub struct PgFollowRepository {
    pool: PgPool,
}

impl PgFollowRepository {
    /// Create a new follow repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FollowRepository for PgFollowRepository {
    async fn exists(&self, follower_id: Uuid, following_id: Uuid) -> DbResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM follows WHERE follower_id = $1 AND following_id = $2)",
        )
        .bind(follower_id)
        .bind(following_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn follow(
        &self,
        follower_id: Uuid,
        following_id: Uuid,
        activity: CreateActivity,
    ) -> DbResult<bool> {
        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query(
            "INSERT INTO follows (follower_id, following_id) VALUES ($1, $2) \
             ON CONFLICT DO NOTHING",
        )
        .bind(follower_id)
        .bind(following_id)
        .execute(&mut *tx)
        .await?;
        if inserted.rows_affected() == 0 {
            return Ok(false);
        }

        sqlx::query("UPDATE users SET following_count = following_count + 1 WHERE id = $1")
            .bind(follower_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("UPDATE users SET followers_count = followers_count + 1 WHERE id = $1")
            .bind(following_id)
            .execute(&mut *tx)
            .await?;
        insert_activity(&mut *tx, &activity).await?;

        tx.commit().await?;
        Ok(true)
    }

    async fn unfollow(&self, follower_id: Uuid, following_id: Uuid) -> DbResult<bool> {
        let mut tx = self.pool.begin().await?;

        let deleted =
            sqlx::query("DELETE FROM follows WHERE follower_id = $1 AND following_id = $2")
                .bind(follower_id)
                .bind(following_id)
                .execute(&mut *tx)
                .await?;
        if deleted.rows_affected() == 0 {
            return Ok(false);
        }

        sqlx::query(
            "UPDATE users SET following_count = GREATEST(following_count - 1, 0) WHERE id = $1",
        )
        .bind(follower_id)
        .execute(&mut *tx)
        .await?;
        sqlx::query(
            "UPDATE users SET followers_count = GREATEST(followers_count - 1, 0) WHERE id = $1",
        )
        .bind(following_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(true)
    }

    async fn followers_of(&self, user_id: Uuid) -> DbResult<Vec<FollowProfileRow>> {
        let rows = sqlx::query_as::<_, FollowProfileRow>(
            r#"
            SELECT u.id AS user_id, u.username, u.image
            FROM follows f
            JOIN users u ON u.id = f.follower_id
            WHERE f.following_id = $1
            ORDER BY f.created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn following_of(&self, user_id: Uuid) -> DbResult<Vec<FollowProfileRow>> {
        let rows = sqlx::query_as::<_, FollowProfileRow>(
            r#"
            SELECT u.id AS user_id, u.username, u.image
            FROM follows f
            JOIN users u ON u.id = f.following_id
            WHERE f.follower_id = $1
            ORDER BY f.created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
