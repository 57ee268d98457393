//! PostgreSQL post like repository

use async_trait::async_trait;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use super::activity::insert_activity;
use crate::error::DbResult;
use crate::models::PostLikerRow;
use crate::repo::{CreateActivity, LikeRepository};

/// PostgreSQL like repository
#[derive(Clone)]
pub struct PgLikeRepository {
    pool: PgPool,
}

impl PgLikeRepository {
    /// Create a new like repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Set `likes_count` from the like rows and return it
async fn recount(conn: &mut PgConnection, post_id: Uuid) -> DbResult<i64> {
    let count = sqlx::query_scalar::<_, i64>(
        r#"
        UPDATE posts
        SET likes_count = (SELECT COUNT(*) FROM post_likes WHERE post_id = $1)
        WHERE id = $1
        RETURNING likes_count
        "#,
    )
    .bind(post_id)
    .fetch_one(conn)
    .await?;

    Ok(count)
}

#[async_trait]
impl LikeRepository for PgLikeRepository {
    async fn like(
        &self,
        post_id: Uuid,
        user_id: Uuid,
        activity: CreateActivity,
    ) -> DbResult<Option<i64>> {
        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query(
            "INSERT INTO post_likes (post_id, user_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(post_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;
        if inserted.rows_affected() == 0 {
            return Ok(None);
        }

        let count = recount(&mut *tx, post_id).await?;
        insert_activity(&mut *tx, &activity).await?;

        tx.commit().await?;
        Ok(Some(count))
    }

    async fn unlike(&self, post_id: Uuid, user_id: Uuid) -> DbResult<Option<i64>> {
        let mut tx = self.pool.begin().await?;

        let deleted = sqlx::query("DELETE FROM post_likes WHERE post_id = $1 AND user_id = $2")
            .bind(post_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        if deleted.rows_affected() == 0 {
            return Ok(None);
        }

        let count = recount(&mut *tx, post_id).await?;

        tx.commit().await?;
        Ok(Some(count))
    }

    async fn likers_of(&self, post_ids: &[Uuid]) -> DbResult<Vec<PostLikerRow>> {
        if post_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, PostLikerRow>(
            r#"
            SELECT l.post_id, l.user_id, u.username
            FROM post_likes l
            JOIN users u ON u.id = l.user_id
            WHERE l.post_id = ANY($1)
            ORDER BY l.created_at
            "#,
        )
        .bind(post_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
