//! Database row models
//!
//! These types map directly to database rows using SQLx's FromRow derive.

use agora_types::{
    display_name, Gender, HashtagId, HashtagLink, ImageId, PostId, SessionId, UserId,
};
use chrono::{DateTime, Duration, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// User row from the database
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub hashed_password: String,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub gender: String,
    pub image: Option<String>,
    pub is_active: bool,
    pub is_verified: bool,
    pub is_superuser: bool,
    pub followers_count: i64,
    pub following_count: i64,
    pub created_at: DateTime<Utc>,
}

impl UserRow {
    /// Convert to domain UserId
    pub fn user_id(&self) -> UserId {
        UserId(self.id)
    }

    /// Parsed gender, defaulting when the column holds an unknown value
    pub fn gender(&self) -> Gender {
        self.gender.parse().unwrap_or_default()
    }

    /// Name shown in feeds and activity entries
    pub fn display_name(&self) -> String {
        display_name(self.username.as_deref(), &self.email)
    }
}

/// Lifetime window shared by refresh and verification sessions.
///
/// A session is active while `now < created_at + expires_in` and expired
/// from that instant on.
pub trait SessionWindow {
    fn created_at(&self) -> DateTime<Utc>;
    fn expires_in(&self) -> i64;

    fn expires_at(&self) -> DateTime<Utc> {
        self.created_at() + Duration::seconds(self.expires_in())
    }

    fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at()
    }
}

/// Refresh session row
#[derive(Debug, Clone, FromRow)]
pub struct RefreshSessionRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token_hash: String,
    pub expires_in: i64,
    pub created_at: DateTime<Utc>,
}

/// Email verification session row
#[derive(Debug, Clone, FromRow)]
pub struct VerificationSessionRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token_hash: String,
    pub expires_in: i64,
    pub created_at: DateTime<Utc>,
}

macro_rules! session_row {
    ($row:ty) => {
        impl SessionWindow for $row {
            fn created_at(&self) -> DateTime<Utc> {
                self.created_at
            }

            fn expires_in(&self) -> i64 {
                self.expires_in
            }
        }

        impl $row {
            /// Convert to domain SessionId
            pub fn session_id(&self) -> SessionId {
                SessionId(self.id)
            }

            /// Convert to domain UserId
            pub fn user_id(&self) -> UserId {
                UserId(self.user_id)
            }
        }
    };
}

session_row!(RefreshSessionRow);
session_row!(VerificationSessionRow);

/// One side of a follow edge joined with that user's public fields
#[derive(Debug, Clone, FromRow)]
pub struct FollowProfileRow {
    pub user_id: Uuid,
    pub username: Option<String>,
    pub image: Option<String>,
}

/// Post row
#[derive(Debug, Clone, FromRow)]
pub struct PostRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: Option<String>,
    pub content: Option<String>,
    pub image_id: Option<Uuid>,
    pub likes_count: i64,
    pub created_at: DateTime<Utc>,
}

impl PostRow {
    pub fn post_id(&self) -> PostId {
        PostId(self.id)
    }

    pub fn user_id(&self) -> UserId {
        UserId(self.user_id)
    }
}

/// Uploaded post image row
#[derive(Debug, Clone, FromRow)]
pub struct PostImageRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl PostImageRow {
    pub fn image_id(&self) -> ImageId {
        ImageId(self.id)
    }
}

/// Hashtag row
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct HashtagRow {
    pub id: Uuid,
    pub name: String,
}

/// Hashtag attached to a post
#[derive(Debug, Clone, FromRow)]
pub struct PostHashtagRow {
    pub post_id: Uuid,
    pub hashtag_id: Uuid,
    pub name: String,
}

/// User who liked a post
#[derive(Debug, Clone, FromRow)]
pub struct PostLikerRow {
    pub post_id: Uuid,
    pub user_id: Uuid,
    pub username: Option<String>,
}

/// Feed row: a post, its author's name and, for hashtag-filtered feeds,
/// the association that matched
#[derive(Debug, Clone, FromRow)]
pub struct FeedPostRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: Option<String>,
    pub content: Option<String>,
    pub image_id: Option<Uuid>,
    pub likes_count: i64,
    pub created_at: DateTime<Utc>,
    pub author_name: Option<String>,
    pub link_post_id: Option<Uuid>,
    pub link_hashtag_id: Option<Uuid>,
}

impl FeedPostRow {
    /// Matched post/hashtag association, if the feed was hashtag-filtered
    pub fn hashtag_link(&self) -> Option<HashtagLink> {
        match (self.link_post_id, self.link_hashtag_id) {
            (Some(post_id), Some(hashtag_id)) => Some(HashtagLink {
                post_id: PostId(post_id),
                hashtag_id: HashtagId(hashtag_id),
            }),
            _ => None,
        }
    }
}

/// Kind of event recorded in the activity log
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityKind {
    Like,
    Follow,
}

impl ActivityKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Like => "like",
            Self::Follow => "follow",
        }
    }
}

/// Activity log row
#[derive(Debug, Clone, FromRow)]
pub struct ActivityRow {
    pub id: Uuid,
    /// User the activity is addressed to (followed user, post owner)
    pub username: String,
    pub kind: String,
    /// User who performed the action
    pub actor_username: String,
    pub actor_image: Option<String>,
    pub post_id: Option<Uuid>,
    pub post_image_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(created_at: DateTime<Utc>, expires_in: i64) -> RefreshSessionRow {
        RefreshSessionRow {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            token_hash: "hash".to_string(),
            expires_in,
            created_at,
        }
    }

    #[test]
    fn test_session_window_boundary() {
        let created = Utc::now();
        let row = session(created, 60);

        assert!(!row.is_expired_at(created));
        assert!(!row.is_expired_at(created + Duration::seconds(59)));
        // Expiry is inclusive of the boundary instant
        assert!(row.is_expired_at(created + Duration::seconds(60)));
        assert!(row.is_expired_at(created + Duration::seconds(61)));
    }

    #[test]
    fn test_feed_row_link() {
        let mut row = FeedPostRow {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            title: None,
            content: None,
            image_id: None,
            likes_count: 0,
            created_at: Utc::now(),
            author_name: None,
            link_post_id: None,
            link_hashtag_id: None,
        };
        assert!(row.hashtag_link().is_none());

        row.link_post_id = Some(row.id);
        row.link_hashtag_id = Some(Uuid::new_v4());
        assert_eq!(row.hashtag_link().unwrap().post_id, PostId(row.id));
    }
}
