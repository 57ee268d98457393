//! PostgreSQL repository implementations

mod activity;
mod follow;
mod image;
mod like;
mod post;
mod session;
mod table;
mod user;

pub use activity::PgActivityRepository;
pub use follow::PgFollowRepository;
pub use image::PgImageRepository;
pub use like::PgLikeRepository;
pub use post::PgPostRepository;
pub use session::{PgRefreshSessionRepository, PgVerificationSessionRepository};
pub use table::{Entity, PgTable};
pub use user::PgUserRepository;

use crate::DbPool;

/// All repositories bundled together
#[derive(Clone)]
pub struct Repositories {
    pub users: PgUserRepository,
    pub refresh_sessions: PgRefreshSessionRepository,
    pub verification_sessions: PgVerificationSessionRepository,
    pub follows: PgFollowRepository,
    pub likes: PgLikeRepository,
    pub posts: PgPostRepository,
    pub images: PgImageRepository,
    pub activities: PgActivityRepository,
}

impl Repositories {
    /// Create all repositories from a database pool
    pub fn new(pool: DbPool) -> Self {
        Self {
            users: PgUserRepository::new(pool.clone()),
            refresh_sessions: PgRefreshSessionRepository::new(pool.clone()),
            verification_sessions: PgVerificationSessionRepository::new(pool.clone()),
            follows: PgFollowRepository::new(pool.clone()),
            likes: PgLikeRepository::new(pool.clone()),
            posts: PgPostRepository::new(pool.clone()),
            images: PgImageRepository::new(pool.clone()),
            activities: PgActivityRepository::new(pool),
        }
    }
}
