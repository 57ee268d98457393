//! Read models returned by the social services

use agora_db::{ActivityRow, FeedPostRow, FollowProfileRow, HashtagRow, PostImageRow, UserRow};
use agora_types::{Gender, HashtagId, HashtagLink, ImageId, PostId, UserId};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// A user as shown in follower, following and liker lists
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserSummary {
    pub user_id: UserId,
    pub username: Option<String>,
    pub image: Option<String>,
}

impl From<FollowProfileRow> for UserSummary {
    fn from(row: FollowProfileRow) -> Self {
        Self {
            user_id: UserId(row.user_id),
            username: row.username,
            image: row.image,
        }
    }
}

/// Uploaded post image
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageView {
    pub id: ImageId,
    pub user_id: UserId,
    pub image: Option<String>,
}

impl From<PostImageRow> for ImageView {
    fn from(row: PostImageRow) -> Self {
        Self {
            id: row.image_id(),
            user_id: UserId(row.user_id),
            image: row.image,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HashtagView {
    pub id: HashtagId,
    pub name: String,
}

impl From<HashtagRow> for HashtagView {
    fn from(row: HashtagRow) -> Self {
        Self {
            id: HashtagId(row.id),
            name: row.name,
        }
    }
}

/// A post with its image, hashtags and likers attached
#[derive(Debug, Clone, Serialize)]
pub struct PostView {
    pub id: PostId,
    pub user_id: UserId,
    pub title: Option<String>,
    pub content: Option<String>,
    pub image: Option<ImageView>,
    pub hashtags: Vec<HashtagView>,
    pub liked_by: Vec<UserSummary>,
    pub likes_count: i64,
    pub created_at: DateTime<Utc>,
}

/// One feed row
#[derive(Debug, Clone, Serialize)]
pub struct FeedEntry {
    pub id: PostId,
    pub user_id: UserId,
    pub title: Option<String>,
    pub content: Option<String>,
    pub image_id: Option<ImageId>,
    pub likes_count: i64,
    pub created_at: DateTime<Utc>,
    pub author_name: Option<String>,
    /// Matched association, present on hashtag-filtered feeds only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hashtag_link: Option<HashtagLink>,
}

impl From<FeedPostRow> for FeedEntry {
    fn from(row: FeedPostRow) -> Self {
        let hashtag_link = row.hashtag_link();
        Self {
            id: PostId(row.id),
            user_id: UserId(row.user_id),
            title: row.title,
            content: row.content,
            image_id: row.image_id.map(ImageId),
            likes_count: row.likes_count,
            created_at: row.created_at,
            author_name: row.author_name,
            hashtag_link,
        }
    }
}

/// Public profile with counters, posts and both sides of the graph
#[derive(Debug, Clone, Serialize)]
pub struct ProfileView {
    pub user_id: UserId,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub gender: Gender,
    pub image: Option<String>,
    pub followers_count: i64,
    pub following_count: i64,
    pub posts: Vec<PostView>,
    pub followers: Vec<UserSummary>,
    pub following: Vec<UserSummary>,
}

impl ProfileView {
    pub(crate) fn new(
        user: UserRow,
        posts: Vec<PostView>,
        followers: Vec<UserSummary>,
        following: Vec<UserSummary>,
    ) -> Self {
        Self {
            user_id: user.user_id(),
            gender: user.gender(),
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
            description: user.description,
            location: user.location,
            image: user.image,
            followers_count: user.followers_count,
            following_count: user.following_count,
            posts,
            followers,
            following,
        }
    }
}

/// Activity log entry
#[derive(Debug, Clone, Serialize)]
pub struct ActivityView {
    pub id: Uuid,
    pub username: String,
    pub kind: String,
    pub actor_username: String,
    pub actor_image: Option<String>,
    pub post_id: Option<PostId>,
    pub post_image_id: Option<ImageId>,
    pub created_at: DateTime<Utc>,
}

impl From<ActivityRow> for ActivityView {
    fn from(row: ActivityRow) -> Self {
        Self {
            id: row.id,
            username: row.username,
            kind: row.kind,
            actor_username: row.actor_username,
            actor_image: row.actor_image,
            post_id: row.post_id.map(PostId),
            post_image_id: row.post_image_id.map(ImageId),
            created_at: row.created_at,
        }
    }
}
