//! Activity log reads

use agora_db::ActivityRepository;
use std::sync::Arc;

use crate::{page::PageRequest, store::SocialStore, view::ActivityView, SocialError};

/// Read side of the follow/like activity log
pub struct ActivityLog<S: SocialStore> {
    store: Arc<S>,
}

impl<S: SocialStore> ActivityLog<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Activities addressed to `username`, newest first
    pub async fn for_user(
        &self,
        username: &str,
        page: i64,
        limit: i64,
    ) -> Result<Vec<ActivityView>, SocialError> {
        let page = PageRequest::new(page, limit);
        let rows = self
            .store
            .activities()
            .find_by_username(username, page.offset(), page.limit)
            .await?;

        Ok(rows.into_iter().map(ActivityView::from).collect())
    }
}
