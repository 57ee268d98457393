//! Repository traits
//!
//! Define async repository interfaces for database operations. Operations
//! that touch more than one table (registration, email confirmation,
//! follow, like, post creation) are single repository calls so that each
//! implementation can run them in one transaction.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::DbResult;
use crate::models::*;

/// User repository trait
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find a user by ID
    async fn find_by_id(&self, id: Uuid) -> DbResult<Option<UserRow>>;

    /// Find a user by email
    async fn find_by_email(&self, email: &str) -> DbResult<Option<UserRow>>;

    /// Find a user by username
    async fn find_by_username(&self, username: &str) -> DbResult<Option<UserRow>>;

    /// List all users
    async fn find_all(&self) -> DbResult<Vec<UserRow>>;

    /// Create a user together with its email verification session.
    ///
    /// Fails with `DbError::Conflict` when the email is taken.
    async fn create_with_verification(
        &self,
        user: CreateUser,
        verification: CreateVerificationSession,
    ) -> DbResult<UserRow>;

    /// Apply profile changes; `None` fields are left untouched
    async fn update_profile(&self, id: Uuid, profile: UpdateProfile) -> DbResult<Option<UserRow>>;

    /// Set the avatar image path
    async fn update_image(&self, id: Uuid, image: &str) -> DbResult<()>;

    /// Delete a user (sessions, edges and posts cascade)
    async fn delete(&self, id: Uuid) -> DbResult<()>;
}

/// Create user input
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub id: Uuid,
    pub email: String,
    pub hashed_password: String,
}

/// Profile update input
#[derive(Debug, Clone, Default)]
pub struct UpdateProfile {
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub gender: Option<String>,
    pub hashed_password: Option<String>,
}

/// Refresh session repository trait
#[async_trait]
pub trait RefreshSessionRepository: Send + Sync {
    /// Create a new refresh session
    async fn create(&self, session: CreateRefreshSession) -> DbResult<RefreshSessionRow>;

    /// Find a session by token hash (expired rows included)
    async fn find_by_token_hash(&self, token_hash: &str) -> DbResult<Option<RefreshSessionRow>>;

    /// Find all sessions for a user
    async fn find_by_user_id(&self, user_id: Uuid) -> DbResult<Vec<RefreshSessionRow>>;

    /// Replace the token of a session and restart its lifetime window at `now`.
    ///
    /// Only succeeds while the row still carries `old_token_hash`; returns
    /// false when another caller rotated or deleted it first.
    async fn rotate(
        &self,
        id: Uuid,
        old_token_hash: &str,
        new_token_hash: &str,
        expires_in: i64,
        now: DateTime<Utc>,
    ) -> DbResult<bool>;

    /// Delete a session by ID
    async fn delete(&self, id: Uuid) -> DbResult<bool>;

    /// Delete a session by token hash
    async fn delete_by_token_hash(&self, token_hash: &str) -> DbResult<bool>;

    /// Delete expired sessions
    async fn delete_expired(&self) -> DbResult<u64>;
}

/// Create refresh session input
#[derive(Debug, Clone)]
pub struct CreateRefreshSession {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token_hash: String,
    pub expires_in: i64,
}

/// Email verification session repository trait
#[async_trait]
pub trait VerificationSessionRepository: Send + Sync {
    /// Find a session by token hash (expired rows included)
    async fn find_by_token_hash(
        &self,
        token_hash: &str,
    ) -> DbResult<Option<VerificationSessionRow>>;

    /// Mark the owning user verified and delete the session.
    ///
    /// Returns false when the session was already consumed.
    async fn confirm(&self, session_id: Uuid, user_id: Uuid) -> DbResult<bool>;

    /// Delete the session and its owning user
    async fn purge(&self, session_id: Uuid, user_id: Uuid) -> DbResult<()>;

    /// Purge every expired session together with its still-unverified user
    async fn purge_expired(&self) -> DbResult<u64>;
}

/// Create verification session input
#[derive(Debug, Clone)]
pub struct CreateVerificationSession {
    pub id: Uuid,
    pub token_hash: String,
    pub expires_in: i64,
}

/// Follow edge repository trait
#[async_trait]
pub trait FollowRepository: Send + Sync {
    /// Check whether the edge exists
    async fn exists(&self, follower_id: Uuid, following_id: Uuid) -> DbResult<bool>;

    /// Insert the edge, bump both counters and record the activity.
    ///
    /// Returns false without writing anything when the edge already exists.
    async fn follow(
        &self,
        follower_id: Uuid,
        following_id: Uuid,
        activity: CreateActivity,
    ) -> DbResult<bool>;

    /// Delete exactly the `(follower_id, following_id)` edge and decrement
    /// both counters. Returns false when the edge was absent.
    async fn unfollow(&self, follower_id: Uuid, following_id: Uuid) -> DbResult<bool>;

    /// Users following `user_id`
    async fn followers_of(&self, user_id: Uuid) -> DbResult<Vec<FollowProfileRow>>;

    /// Users `user_id` follows
    async fn following_of(&self, user_id: Uuid) -> DbResult<Vec<FollowProfileRow>>;
}

/// Post like repository trait
#[async_trait]
pub trait LikeRepository: Send + Sync {
    /// Add the like, recompute `likes_count` and record the activity.
    ///
    /// Returns the new count, or `None` when the like already existed.
    async fn like(
        &self,
        post_id: Uuid,
        user_id: Uuid,
        activity: CreateActivity,
    ) -> DbResult<Option<i64>>;

    /// Remove the like and recompute `likes_count`.
    ///
    /// Returns the new count, or `None` when there was no like.
    async fn unlike(&self, post_id: Uuid, user_id: Uuid) -> DbResult<Option<i64>>;

    /// Users who like any of the given posts
    async fn likers_of(&self, post_ids: &[Uuid]) -> DbResult<Vec<PostLikerRow>>;
}

/// Post and hashtag repository trait
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Find a post by ID
    async fn find_by_id(&self, id: Uuid) -> DbResult<Option<PostRow>>;

    /// Insert a post, reuse or create its hashtags and link them
    async fn create(&self, post: CreatePost) -> DbResult<(PostRow, Vec<HashtagRow>)>;

    /// Count posts, optionally only those tagged with `hashtag`
    async fn count(&self, hashtag: Option<&str>) -> DbResult<i64>;

    /// Newest-first page of posts joined with the author's name
    async fn feed_page(
        &self,
        offset: i64,
        limit: i64,
        hashtag: Option<&str>,
    ) -> DbResult<Vec<FeedPostRow>>;

    /// All posts by a user, newest first
    async fn find_by_user(&self, user_id: Uuid) -> DbResult<Vec<PostRow>>;

    /// Hashtags attached to any of the given posts
    async fn hashtags_of(&self, post_ids: &[Uuid]) -> DbResult<Vec<PostHashtagRow>>;

    /// Find a hashtag by exact name
    async fn find_hashtag(&self, name: &str) -> DbResult<Option<HashtagRow>>;

    /// All posts tagged with a hashtag, newest first
    async fn find_by_hashtag(&self, hashtag_id: Uuid) -> DbResult<Vec<PostRow>>;
}

/// Create post input
#[derive(Debug, Clone)]
pub struct CreatePost {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: Option<String>,
    pub content: Option<String>,
    pub image_id: Option<Uuid>,
    /// Distinct hashtag names extracted from the content
    pub hashtags: Vec<String>,
}

/// Post image repository trait
#[async_trait]
pub trait ImageRepository: Send + Sync {
    /// Find an image by ID
    async fn find_by_id(&self, id: Uuid) -> DbResult<Option<PostImageRow>>;

    /// Record an uploaded image
    async fn create(&self, image: CreateImage) -> DbResult<PostImageRow>;
}

/// Create image input
#[derive(Debug, Clone)]
pub struct CreateImage {
    pub id: Uuid,
    pub user_id: Uuid,
    pub image: String,
}

/// Activity log repository trait
#[async_trait]
pub trait ActivityRepository: Send + Sync {
    /// Activities addressed to `username`, newest first
    async fn find_by_username(
        &self,
        username: &str,
        offset: i64,
        limit: i64,
    ) -> DbResult<Vec<ActivityRow>>;
}

/// Create activity input. Written only as part of a follow or like.
#[derive(Debug, Clone)]
pub struct CreateActivity {
    pub id: Uuid,
    pub username: String,
    pub kind: ActivityKind,
    pub actor_username: String,
    pub actor_image: Option<String>,
    pub post_id: Option<Uuid>,
    pub post_image_id: Option<Uuid>,
}
