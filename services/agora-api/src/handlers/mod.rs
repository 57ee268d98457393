//! HTTP handlers

mod auth;
mod feed;
mod health;
mod posts;
mod profile;
mod users;

pub use auth::{login, logout, refresh, register, verify_email};
pub use feed::{activity, get_feed, hashtag_posts};
pub use health::{health, ready};
pub use posts::{create_post, like, own_posts, unlike, upload_image};
pub use profile::{follow, followers, following, get_profile, unfollow};
pub use users::{delete_me, list_users, me, update_me, upload_avatar, UserInfo};
