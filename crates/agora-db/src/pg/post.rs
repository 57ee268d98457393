//! PostgreSQL post and hashtag repository

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::table::{PgTable, POST_COLUMNS};
use crate::error::DbResult;
use crate::models::{FeedPostRow, HashtagRow, PostHashtagRow, PostRow};
use crate::repo::{CreatePost, PostRepository};

const FEED_COLUMNS: &str = "p.id, p.user_id, p.title, p.content, p.image_id, p.likes_count, \
     p.created_at, \
     COALESCE(NULLIF(u.username, ''), split_part(u.email, '@', 1)) AS author_name";

/// PostgreSQL post repository
#[derive(Clone)]
pub struct PgPostRepository {
    table: PgTable<PostRow>,
}

impl PgPostRepository {
    /// Create a new post repository
    pub fn new(pool: PgPool) -> Self {
        Self {
            table: PgTable::new(pool),
        }
    }
}

#[async_trait]
impl PostRepository for PgPostRepository {
    async fn find_by_id(&self, id: Uuid) -> DbResult<Option<PostRow>> {
        self.table.find_by_id(id).await
    }

    async fn create(&self, post: CreatePost) -> DbResult<(PostRow, Vec<HashtagRow>)> {
        let mut tx = self.table.pool().begin().await?;

        let sql = format!(
            "INSERT INTO posts (id, user_id, title, content, image_id) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {POST_COLUMNS}"
        );
        let row = sqlx::query_as::<_, PostRow>(&sql)
            .bind(post.id)
            .bind(post.user_id)
            .bind(&post.title)
            .bind(&post.content)
            .bind(post.image_id)
            .fetch_one(&mut *tx)
            .await?;

        if post.hashtags.is_empty() {
            tx.commit().await?;
            return Ok((row, Vec::new()));
        }

        let fresh_ids: Vec<Uuid> = post.hashtags.iter().map(|_| Uuid::now_v7()).collect();
        sqlx::query(
            r#"
            INSERT INTO hashtags (id, name)
            SELECT * FROM UNNEST($1::uuid[], $2::text[])
            ON CONFLICT (name) DO NOTHING
            "#,
        )
        .bind(&fresh_ids[..])
        .bind(&post.hashtags[..])
        .execute(&mut *tx)
        .await?;

        let hashtags = sqlx::query_as::<_, HashtagRow>(
            "SELECT id, name FROM hashtags WHERE name = ANY($1) ORDER BY name",
        )
        .bind(&post.hashtags[..])
        .fetch_all(&mut *tx)
        .await?;

        let hashtag_ids: Vec<Uuid> = hashtags.iter().map(|h| h.id).collect();
        sqlx::query(
            r#"
            INSERT INTO post_hashtags (post_id, hashtag_id)
            SELECT $1, UNNEST($2::uuid[])
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(row.id)
        .bind(&hashtag_ids[..])
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok((row, hashtags))
    }

    async fn count(&self, hashtag: Option<&str>) -> DbResult<i64> {
        let count = match hashtag {
            Some(name) => {
                sqlx::query_scalar::<_, i64>(
                    r#"
                    SELECT COUNT(*)
                    FROM post_hashtags ph
                    JOIN hashtags h ON h.id = ph.hashtag_id
                    WHERE h.name = $1
                    "#,
                )
                .bind(name)
                .fetch_one(self.table.pool())
                .await?
            }
            None => {
                sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM posts")
                    .fetch_one(self.table.pool())
                    .await?
            }
        };

        Ok(count)
    }

    async fn feed_page(
        &self,
        offset: i64,
        limit: i64,
        hashtag: Option<&str>,
    ) -> DbResult<Vec<FeedPostRow>> {
        let rows = match hashtag {
            Some(name) => {
                let sql = format!(
                    r#"
                    SELECT {FEED_COLUMNS},
                           ph.post_id AS link_post_id, ph.hashtag_id AS link_hashtag_id
                    FROM posts p
                    LEFT JOIN users u ON u.id = p.user_id
                    JOIN post_hashtags ph ON ph.post_id = p.id
                    JOIN hashtags h ON h.id = ph.hashtag_id
                    WHERE h.name = $3
                    ORDER BY p.created_at DESC, p.id DESC
                    OFFSET $1 LIMIT $2
                    "#
                );
                sqlx::query_as::<_, FeedPostRow>(&sql)
                    .bind(offset)
                    .bind(limit)
                    .bind(name)
                    .fetch_all(self.table.pool())
                    .await?
            }
            None => {
                let sql = format!(
                    r#"
                    SELECT {FEED_COLUMNS},
                           NULL::uuid AS link_post_id, NULL::uuid AS link_hashtag_id
                    FROM posts p
                    LEFT JOIN users u ON u.id = p.user_id
                    ORDER BY p.created_at DESC, p.id DESC
                    OFFSET $1 LIMIT $2
                    "#
                );
                sqlx::query_as::<_, FeedPostRow>(&sql)
                    .bind(offset)
                    .bind(limit)
                    .fetch_all(self.table.pool())
                    .await?
            }
        };

        Ok(rows)
    }

    async fn find_by_user(&self, user_id: Uuid) -> DbResult<Vec<PostRow>> {
        let sql = format!(
            "SELECT {POST_COLUMNS} FROM posts WHERE user_id = $1 \
             ORDER BY created_at DESC, id DESC"
        );
        let rows = sqlx::query_as::<_, PostRow>(&sql)
            .bind(user_id)
            .fetch_all(self.table.pool())
            .await?;

        Ok(rows)
    }

    async fn hashtags_of(&self, post_ids: &[Uuid]) -> DbResult<Vec<PostHashtagRow>> {
        if post_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, PostHashtagRow>(
            r#"
            SELECT ph.post_id, ph.hashtag_id, h.name
            FROM post_hashtags ph
            JOIN hashtags h ON h.id = ph.hashtag_id
            WHERE ph.post_id = ANY($1)
            ORDER BY h.name
            "#,
        )
        .bind(post_ids)
        .fetch_all(self.table.pool())
        .await?;

        Ok(rows)
    }

    async fn find_hashtag(&self, name: &str) -> DbResult<Option<HashtagRow>> {
        let row = sqlx::query_as::<_, HashtagRow>("SELECT id, name FROM hashtags WHERE name = $1")
            .bind(name)
            .fetch_optional(self.table.pool())
            .await?;

        Ok(row)
    }

    async fn find_by_hashtag(&self, hashtag_id: Uuid) -> DbResult<Vec<PostRow>> {
        let rows = sqlx::query_as::<_, PostRow>(
            r#"
            SELECT p.id, p.user_id, p.title, p.content, p.image_id, p.likes_count, p.created_at
            FROM posts p
            JOIN post_hashtags ph ON ph.post_id = p.id
            WHERE ph.hashtag_id = $1
            ORDER BY p.created_at DESC, p.id DESC
            "#,
        )
        .bind(hashtag_id)
        .fetch_all(self.table.pool())
        .await?;

        Ok(rows)
    }
}
