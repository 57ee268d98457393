//! PostgreSQL activity log repository

use async_trait::async_trait;
use sqlx::{PgConnection, PgPool};

use crate::error::DbResult;
use crate::models::ActivityRow;
use crate::repo::{ActivityRepository, CreateActivity};

/// PostgreSQL activity repository
#[derive(Clone)]
pub struct PgActivityRepository {
    pool: PgPool,
}

impl PgActivityRepository {
    /// Create a new activity repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Append an activity inside the caller's transaction
pub(crate) async fn insert_activity(
    conn: &mut PgConnection,
    activity: &CreateActivity,
) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO activities
            (id, username, kind, actor_username, actor_image, post_id, post_image_id)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        "#,
    )
    .bind(activity.id)
    .bind(&activity.username)
    .bind(activity.kind.as_str())
    .bind(&activity.actor_username)
    .bind(&activity.actor_image)
    .bind(activity.post_id)
    .bind(activity.post_image_id)
    .execute(conn)
    .await?;

    Ok(())
}

#[async_trait]
impl ActivityRepository for PgActivityRepository {
    async fn find_by_username(
        &self,
        username: &str,
        offset: i64,
        limit: i64,
    ) -> DbResult<Vec<ActivityRow>> {
        let rows = sqlx::query_as::<_, ActivityRow>(
            r#"
            SELECT id, username, kind, actor_username, actor_image, post_id, post_image_id, created_at
            FROM activities
            WHERE username = $1
            ORDER BY created_at DESC, id DESC
            OFFSET $2 LIMIT $3
            "#,
        )
        .bind(username)
        .bind(offset)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
