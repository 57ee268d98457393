//! Feed assembly, post creation and post listings

use agora_db::{CreateImage, CreatePost, ImageRepository, LikeRepository, PostRepository, PostRow, UserRepository};
use agora_types::{ImageId, PostId, UserId};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    blob::BlobStore,
    hashtag::extract_hashtags,
    page::PageRequest,
    store::SocialStore,
    view::{FeedEntry, HashtagView, ImageView, PostView, UserSummary},
    SocialError,
};

/// Input for a new post
#[derive(Debug, Clone, Default)]
pub struct NewPost {
    pub title: Option<String>,
    pub content: Option<String>,
    pub image_id: Option<ImageId>,
}

/// Feed and post service
pub struct FeedAssembler<S: SocialStore> {
    store: Arc<S>,
    blobs: Arc<dyn BlobStore>,
}

impl<S: SocialStore> FeedAssembler<S> {
    pub fn new(store: Arc<S>, blobs: Arc<dyn BlobStore>) -> Self {
        Self { store, blobs }
    }

    /// Newest-first page of posts across all users.
    ///
    /// With `hashtag`, only posts tagged with exactly that name are counted
    /// and returned. A page starting at or past the matching total is empty.
    pub async fn get_feed(
        &self,
        page: i64,
        limit: i64,
        hashtag: Option<&str>,
    ) -> Result<Vec<FeedEntry>, SocialError> {
        let page = PageRequest::new(page, limit);
        let hashtag = hashtag
            .map(|h| h.trim_start_matches('#'))
            .filter(|h| !h.is_empty());

        let total = self.store.posts().count(hashtag).await?;
        let offset = page.offset();
        if offset >= total {
            tracing::debug!(offset, total, "feed exhausted");
            return Ok(Vec::new());
        }

        let rows = self
            .store
            .posts()
            .feed_page(offset, page.limit, hashtag)
            .await?;

        Ok(rows.into_iter().map(FeedEntry::from).collect())
    }

    /// All posts by a user, newest first, with attachments
    pub async fn get_user_posts(&self, user_id: UserId) -> Result<Vec<PostView>, SocialError> {
        let rows = self.store.posts().find_by_user(user_id.0).await?;
        attach(self.store.as_ref(), rows).await
    }

    /// All posts tagged with `name`, newest first
    pub async fn posts_by_hashtag(&self, name: &str) -> Result<Vec<PostView>, SocialError> {
        let name = name.trim_start_matches('#');
        let hashtag = self
            .store
            .posts()
            .find_hashtag(name)
            .await?
            .ok_or(SocialError::HashtagNotFound)?;

        let rows = self.store.posts().find_by_hashtag(hashtag.id).await?;
        attach(self.store.as_ref(), rows).await
    }

    /// Create a post, tagging it with every hashtag in its content.
    ///
    /// An `image_id` that does not name a stored image is dropped.
    pub async fn create_post(
        &self,
        user_id: UserId,
        post: NewPost,
    ) -> Result<PostView, SocialError> {
        if self.store.users().find_by_id(user_id.0).await?.is_none() {
            return Err(SocialError::UserNotFound);
        }

        let image = match post.image_id {
            Some(image_id) => self.store.images().find_by_id(image_id.0).await?,
            None => None,
        };
        let hashtags = post
            .content
            .as_deref()
            .map(extract_hashtags)
            .unwrap_or_default();

        let (row, tags) = self
            .store
            .posts()
            .create(CreatePost {
                id: PostId::new().0,
                user_id: user_id.0,
                title: post.title,
                content: post.content,
                image_id: image.as_ref().map(|i| i.id),
                hashtags,
            })
            .await?;

        tracing::info!(post_id = %row.id, user_id = %user_id, hashtags = tags.len(), "post created");

        Ok(PostView {
            id: row.post_id(),
            user_id: row.user_id(),
            title: row.title,
            content: row.content,
            image: image.map(ImageView::from),
            hashtags: tags.into_iter().map(HashtagView::from).collect(),
            liked_by: Vec::new(),
            likes_count: row.likes_count,
            created_at: row.created_at,
        })
    }

    /// Store an image for a future post
    pub async fn upload_image(
        &self,
        owner_id: UserId,
        bytes: &[u8],
    ) -> Result<ImageView, SocialError> {
        if self.store.users().find_by_id(owner_id.0).await?.is_none() {
            return Err(SocialError::UserNotFound);
        }

        let path = self
            .blobs
            .store(&format!("post_images/post_{owner_id}"), bytes)
            .await?;
        let row = self
            .store
            .images()
            .create(CreateImage {
                id: ImageId::new().0,
                user_id: owner_id.0,
                image: path,
            })
            .await?;

        Ok(ImageView::from(row))
    }
}

/// Attach images, hashtags and likers to post rows, keeping their order
pub(crate) async fn attach<S: SocialStore>(
    store: &S,
    rows: Vec<PostRow>,
) -> Result<Vec<PostView>, SocialError> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<Uuid> = rows.iter().map(|p| p.id).collect();

    let mut hashtags: HashMap<Uuid, Vec<HashtagView>> = HashMap::new();
    for tag in store.posts().hashtags_of(&ids).await? {
        hashtags.entry(tag.post_id).or_default().push(HashtagView {
            id: agora_types::HashtagId(tag.hashtag_id),
            name: tag.name,
        });
    }

    let mut likers: HashMap<Uuid, Vec<UserSummary>> = HashMap::new();
    for liker in store.likes().likers_of(&ids).await? {
        likers.entry(liker.post_id).or_default().push(UserSummary {
            user_id: UserId(liker.user_id),
            username: liker.username,
            image: None,
        });
    }

    let mut images: HashMap<Uuid, ImageView> = HashMap::new();
    for image_id in rows.iter().filter_map(|p| p.image_id) {
        if images.contains_key(&image_id) {
            continue;
        }
        if let Some(image) = store.images().find_by_id(image_id).await? {
            images.insert(image_id, ImageView::from(image));
        }
    }

    Ok(rows
        .into_iter()
        .map(|row| PostView {
            id: row.post_id(),
            user_id: row.user_id(),
            image: row.image_id.and_then(|id| images.get(&id).cloned()),
            hashtags: hashtags.remove(&row.id).unwrap_or_default(),
            liked_by: likers.remove(&row.id).unwrap_or_default(),
            title: row.title,
            content: row.content,
            likes_count: row.likes_count,
            created_at: row.created_at,
        })
        .collect())
}
