//! Post likes

use agora_db::{ActivityKind, CreateActivity, LikeRepository, PostRepository, UserRepository};
use agora_types::{NoopReason, Outcome, PostId};
use std::sync::Arc;
use uuid::Uuid;

use crate::{graph::resolve_user, store::SocialStore, SocialError};

/// Like/unlike service
///
/// `likes_count` is recomputed from the like set on every change.
pub struct Engagement<S: SocialStore> {
    store: Arc<S>,
}

impl<S: SocialStore> Engagement<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// `username` likes the post
    pub async fn like(&self, post_id: PostId, username: &str) -> Result<Outcome, SocialError> {
        let post = self
            .store
            .posts()
            .find_by_id(post_id.0)
            .await?
            .ok_or(SocialError::PostNotFound)?;
        let user = resolve_user(self.store.as_ref(), username).await?;

        let likers = self.store.likes().likers_of(&[post.id]).await?;
        if likers.iter().any(|l| l.user_id == user.id) {
            tracing::debug!(post_id = %post.id, user_id = %user.id, "already liked");
            return Ok(Outcome::noop(NoopReason::AlreadyLiked));
        }

        let owner = self
            .store
            .users()
            .find_by_id(post.user_id)
            .await?
            .ok_or(SocialError::UserNotFound)?;
        let activity = CreateActivity {
            id: Uuid::now_v7(),
            username: owner.display_name(),
            kind: ActivityKind::Like,
            actor_username: user.display_name(),
            actor_image: user.image.clone(),
            post_id: Some(post.id),
            post_image_id: post.image_id,
        };

        match self.store.likes().like(post.id, user.id, activity).await? {
            Some(likes_count) => {
                tracing::info!(post_id = %post.id, user_id = %user.id, likes_count, "post liked");
                Ok(Outcome::applied())
            }
            None => Ok(Outcome::noop(NoopReason::AlreadyLiked)),
        }
    }

    /// `username` withdraws their like
    pub async fn unlike(&self, post_id: PostId, username: &str) -> Result<Outcome, SocialError> {
        let post = self
            .store
            .posts()
            .find_by_id(post_id.0)
            .await?
            .ok_or(SocialError::PostNotFound)?;
        let user = resolve_user(self.store.as_ref(), username).await?;

        match self.store.likes().unlike(post.id, user.id).await? {
            Some(likes_count) => {
                tracing::info!(post_id = %post.id, user_id = %user.id, likes_count, "post unliked");
                Ok(Outcome::applied())
            }
            None => Ok(Outcome::noop(NoopReason::NotLiked)),
        }
    }
}
