//! Generic table access shared by every PostgreSQL repository
//!
//! Each entity declares its table and column list once; repositories
//! compose a `PgTable<Row>` for the lookups every entity has and add their
//! entity-specific queries on top.

use sqlx::postgres::PgRow;
use sqlx::{FromRow, PgPool};
use std::marker::PhantomData;
use uuid::Uuid;

use crate::error::DbResult;
use crate::models::{
    HashtagRow, PostImageRow, PostRow, RefreshSessionRow, UserRow, VerificationSessionRow,
};

/// A row type stored in its own table with a UUID `id` primary key
pub trait Entity: for<'r> FromRow<'r, PgRow> + Send + Unpin {
    /// Table name
    const TABLE: &'static str;
    /// Comma-separated column list matching the row's fields
    const COLUMNS: &'static str;
    /// Default ordering for full scans
    const ORDER_BY: &'static str = "id";
}

/// Typed handle on one entity's table
pub struct PgTable<E> {
    pool: PgPool,
    _entity: PhantomData<fn() -> E>,
}

impl<E> Clone for PgTable<E> {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
            _entity: PhantomData,
        }
    }
}

impl<E: Entity> PgTable<E> {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            _entity: PhantomData,
        }
    }

    /// Underlying pool, for entity-specific queries and transactions
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Fetch one row by primary key
    pub async fn find_by_id(&self, id: Uuid) -> DbResult<Option<E>> {
        let sql = format!("SELECT {} FROM {} WHERE id = $1", E::COLUMNS, E::TABLE);
        let row = sqlx::query_as::<_, E>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row)
    }

    /// Fetch every row
    pub async fn find_all(&self) -> DbResult<Vec<E>> {
        let sql = format!(
            "SELECT {} FROM {} ORDER BY {}",
            E::COLUMNS,
            E::TABLE,
            E::ORDER_BY
        );
        let rows = sqlx::query_as::<_, E>(&sql).fetch_all(&self.pool).await?;

        Ok(rows)
    }

    /// Delete one row by primary key, returning whether it existed
    pub async fn delete_by_id(&self, id: Uuid) -> DbResult<bool> {
        let sql = format!("DELETE FROM {} WHERE id = $1", E::TABLE);
        let result = sqlx::query(&sql).bind(id).execute(&self.pool).await?;

        Ok(result.rows_affected() > 0)
    }
}

pub(crate) const USER_COLUMNS: &str = "id, email, hashed_password, username, first_name, \
     last_name, description, location, gender, image, is_active, is_verified, is_superuser, \
     followers_count, following_count, created_at";

pub(crate) const SESSION_COLUMNS: &str = "id, user_id, token_hash, expires_in, created_at";

pub(crate) const POST_COLUMNS: &str =
    "id, user_id, title, content, image_id, likes_count, created_at";

impl Entity for UserRow {
    const TABLE: &'static str = "users";
    const COLUMNS: &'static str = USER_COLUMNS;
    const ORDER_BY: &'static str = "created_at";
}

impl Entity for RefreshSessionRow {
    const TABLE: &'static str = "refresh_sessions";
    const COLUMNS: &'static str = SESSION_COLUMNS;
}

impl Entity for VerificationSessionRow {
    const TABLE: &'static str = "verification_sessions";
    const COLUMNS: &'static str = SESSION_COLUMNS;
}

impl Entity for PostRow {
    const TABLE: &'static str = "posts";
    const COLUMNS: &'static str = POST_COLUMNS;
    const ORDER_BY: &'static str = "created_at DESC, id DESC";
}

impl Entity for PostImageRow {
    const TABLE: &'static str = "post_images";
    const COLUMNS: &'static str = "id, user_id, image, created_at";
}

impl Entity for HashtagRow {
    const TABLE: &'static str = "hashtags";
    const COLUMNS: &'static str = "id, name";
    const ORDER_BY: &'static str = "name";
}
