//! PostgreSQL post image repository

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::table::PgTable;
use crate::error::DbResult;
use crate::models::PostImageRow;
use crate::repo::{CreateImage, ImageRepository};

/// PostgreSQL image repository
#[derive(Clone)]
pub struct PgImageRepository {
    table: PgTable<PostImageRow>,
}

impl PgImageRepository {
    /// Create a new image repository
    pub fn new(pool: PgPool) -> Self {
        Self {
            table: PgTable::new(pool),
        }
    }
}

#[async_trait]
impl ImageRepository for PgImageRepository {
    async fn find_by_id(&self, id: Uuid) -> DbResult<Option<PostImageRow>> {
        self.table.find_by_id(id).await
    }

    async fn create(&self, image: CreateImage) -> DbResult<PostImageRow> {
        let row = sqlx::query_as::<_, PostImageRow>(
            r#"
            INSERT INTO post_images (id, user_id, image)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, image, created_at
            "#,
        )
        .bind(image.id)
        .bind(image.user_id)
        .bind(&image.image)
        .fetch_one(self.table.pool())
        .await?;

        Ok(row)
    }
}
