//! PostgreSQL user repository implementation

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::table::{PgTable, USER_COLUMNS};
use crate::error::DbResult;
use crate::models::UserRow;
use crate::repo::{CreateUser, CreateVerificationSession, UpdateProfile, UserRepository};

/// PostgreSQL user repository
#[derive(Clone)]
pub struct PgUserRepository {
    table: PgTable<UserRow>,
}

impl PgUserRepository {
    /// Create a new user repository
    pub fn new(pool: PgPool) -> Self {
        Self {
            table: PgTable::new(pool),
        }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_id(&self, id: Uuid) -> DbResult<Option<UserRow>> {
        self.table.find_by_id(id).await
    }

    async fn find_by_email(&self, email: &str) -> DbResult<Option<UserRow>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        let user = sqlx::query_as::<_, UserRow>(&sql)
            .bind(email)
            .fetch_optional(self.table.pool())
            .await?;

        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> DbResult<Option<UserRow>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE username = $1");
        let user = sqlx::query_as::<_, UserRow>(&sql)
            .bind(username)
            .fetch_optional(self.table.pool())
            .await?;

        Ok(user)
    }

    async fn find_all(&self) -> DbResult<Vec<UserRow>> {
        self.table.find_all().await
    }

    async fn create_with_verification(
        &self,
        user: CreateUser,
        verification: CreateVerificationSession,
    ) -> DbResult<UserRow> {
        let mut tx = self.table.pool().begin().await?;

        let sql = format!(
            "INSERT INTO users (id, email, hashed_password) VALUES ($1, $2, $3) \
             RETURNING {USER_COLUMNS}"
        );
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(user.id)
            .bind(&user.email)
            .bind(&user.hashed_password)
            .fetch_one(&mut *tx)
            .await?;

        sqlx::query(
            r#"
            INSERT INTO verification_sessions (id, user_id, token_hash, expires_in)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(verification.id)
        .bind(row.id)
        .bind(&verification.token_hash)
        .bind(verification.expires_in)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(row)
    }

    async fn update_profile(&self, id: Uuid, profile: UpdateProfile) -> DbResult<Option<UserRow>> {
        let sql = format!(
            r#"
            UPDATE users SET
                username = COALESCE($2, username),
                first_name = COALESCE($3, first_name),
                last_name = COALESCE($4, last_name),
                description = COALESCE($5, description),
                location = COALESCE($6, location),
                gender = COALESCE($7, gender),
                hashed_password = COALESCE($8, hashed_password)
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(id)
            .bind(&profile.username)
            .bind(&profile.first_name)
            .bind(&profile.last_name)
            .bind(&profile.description)
            .bind(&profile.location)
            .bind(&profile.gender)
            .bind(&profile.hashed_password)
            .fetch_optional(self.table.pool())
            .await?;

        Ok(row)
    }

    async fn update_image(&self, id: Uuid, image: &str) -> DbResult<()> {
        sqlx::query("UPDATE users SET image = $1 WHERE id = $2")
            .bind(image)
            .bind(id)
            .execute(self.table.pool())
            .await?;

        Ok(())
    }

    async fn delete(&self, id: Uuid) -> DbResult<()> {
        let mut tx = self.table.pool().begin().await?;

        // Counters on the far side of the user's follow edges
        sqlx::query(
            r#"
            UPDATE users SET followers_count = GREATEST(followers_count - 1, 0)
            WHERE id IN (SELECT following_id FROM follows WHERE follower_id = $1)
            "#,
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            UPDATE users SET following_count = GREATEST(following_count - 1, 0)
            WHERE id IN (SELECT follower_id FROM follows WHERE following_id = $1)
            "#,
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        let liked: Vec<Uuid> =
            sqlx::query_scalar("DELETE FROM post_likes WHERE user_id = $1 RETURNING post_id")
                .bind(id)
                .fetch_all(&mut *tx)
                .await?;

        if !liked.is_empty() {
            sqlx::query(
                r#"
                UPDATE posts p
                SET likes_count = (SELECT COUNT(*) FROM post_likes l WHERE l.post_id = p.id)
                WHERE p.id = ANY($1)
                "#,
            )
            .bind(&liked)
            .execute(&mut *tx)
            .await?;
        }

        // Remaining edges, sessions, posts and images cascade
        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::debug!(user_id = %id, liked_posts = liked.len(), "user deleted");
        Ok(())
    }
}
