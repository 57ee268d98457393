//! Follow graph

use agora_db::{ActivityKind, CreateActivity, FollowRepository, UserRepository, UserRow};
use agora_types::{NoopReason, Outcome, UserId};
use std::sync::Arc;
use uuid::Uuid;

use crate::{store::SocialStore, view::UserSummary, SocialError};

/// Resolve a user by username
pub(crate) async fn resolve_user<S: SocialStore>(
    store: &S,
    username: &str,
) -> Result<UserRow, SocialError> {
    store
        .users()
        .find_by_username(username)
        .await?
        .ok_or(SocialError::UserNotFound)
}

/// Follow/unfollow service
///
/// Edge, counters and activity row are written by one repository call so
/// they commit together. Duplicate follows and missing edges are no-op
/// outcomes, not errors.
pub struct SocialGraph<S: SocialStore> {
    store: Arc<S>,
}

impl<S: SocialStore> SocialGraph<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// `follower` starts following `following`
    pub async fn follow(&self, follower: &str, following: &str) -> Result<Outcome, SocialError> {
        let follower = resolve_user(self.store.as_ref(), follower).await?;
        let following = resolve_user(self.store.as_ref(), following).await?;

        if follower.id == following.id {
            tracing::debug!(user_id = %follower.id, "self-follow ignored");
            return Ok(Outcome::noop(NoopReason::SelfFollow));
        }
        if self.store.follows().exists(follower.id, following.id).await? {
            return Ok(Outcome::noop(NoopReason::AlreadyFollowing));
        }

        let activity = CreateActivity {
            id: Uuid::now_v7(),
            username: following.display_name(),
            kind: ActivityKind::Follow,
            actor_username: follower.display_name(),
            actor_image: follower.image.clone(),
            post_id: None,
            post_image_id: None,
        };

        // The primary key decides when two follows race past `exists`
        if !self
            .store
            .follows()
            .follow(follower.id, following.id, activity)
            .await?
        {
            return Ok(Outcome::noop(NoopReason::AlreadyFollowing));
        }

        tracing::info!(follower = %follower.id, following = %following.id, "followed");
        Ok(Outcome::applied())
    }

    /// Remove exactly the `follower -> following` edge
    pub async fn unfollow(&self, follower: &str, following: &str) -> Result<Outcome, SocialError> {
        let follower = resolve_user(self.store.as_ref(), follower).await?;
        let following = resolve_user(self.store.as_ref(), following).await?;

        if !self
            .store
            .follows()
            .unfollow(follower.id, following.id)
            .await?
        {
            return Ok(Outcome::noop(NoopReason::NotFollowing));
        }

        tracing::info!(follower = %follower.id, following = %following.id, "unfollowed");
        Ok(Outcome::applied())
    }

    /// Users following `user_id`
    pub async fn followers(&self, user_id: UserId) -> Result<Vec<UserSummary>, SocialError> {
        let rows = self.store.follows().followers_of(user_id.0).await?;
        Ok(rows.into_iter().map(UserSummary::from).collect())
    }

    /// Users `user_id` follows
    pub async fn following(&self, user_id: UserId) -> Result<Vec<UserSummary>, SocialError> {
        let rows = self.store.follows().following_of(user_id.0).await?;
        Ok(rows.into_iter().map(UserSummary::from).collect())
    }
}
