//! Profiles and avatars

use agora_db::{FollowRepository, PostRepository, UserRepository};
use agora_types::UserId;
use std::sync::Arc;

use crate::{
    blob::BlobStore, feed::attach, graph::resolve_user, store::SocialStore, view::ProfileView,
    view::UserSummary, SocialError,
};

/// Profile reads and avatar uploads
pub struct ProfileService<S: SocialStore> {
    store: Arc<S>,
    blobs: Arc<dyn BlobStore>,
}

impl<S: SocialStore> ProfileService<S> {
    pub fn new(store: Arc<S>, blobs: Arc<dyn BlobStore>) -> Self {
        Self { store, blobs }
    }

    /// Public profile of `username` with posts, followers and following
    pub async fn get_profile(&self, username: &str) -> Result<ProfileView, SocialError> {
        let user = resolve_user(self.store.as_ref(), username).await?;

        let posts = self.store.posts().find_by_user(user.id).await?;
        let posts = attach(self.store.as_ref(), posts).await?;
        let followers = self.store.follows().followers_of(user.id).await?;
        let following = self.store.follows().following_of(user.id).await?;

        Ok(ProfileView::new(
            user,
            posts,
            followers.into_iter().map(UserSummary::from).collect(),
            following.into_iter().map(UserSummary::from).collect(),
        ))
    }

    /// Store a new avatar and return its relative path
    pub async fn upload_avatar(&self, user_id: UserId, bytes: &[u8]) -> Result<String, SocialError> {
        if self.store.users().find_by_id(user_id.0).await?.is_none() {
            return Err(SocialError::UserNotFound);
        }

        let path = self
            .blobs
            .store(&format!("user_images/user_{user_id}"), bytes)
            .await?;
        self.store.users().update_image(user_id.0, &path).await?;

        tracing::info!(user_id = %user_id, %path, "avatar updated");
        Ok(path)
    }
}
