//! Application state

use std::ops::Deref;
use std::sync::Arc;

use agora_auth_core::{AuthService, Notifier};
use agora_db::{
    DbPool, PgRefreshSessionRepository, PgUserRepository, PgVerificationSessionRepository,
    Repositories,
};
use agora_social_core::{
    ActivityLog, BlobStore, Engagement, FeedAssembler, ProfileService, SocialGraph,
};

use crate::config::Config;

/// Type alias for the auth service with concrete repository types
pub type AuthServiceImpl =
    AuthService<PgUserRepository, PgRefreshSessionRepository, PgVerificationSessionRepository>;

/// Shared database pool wrapper for health checks
#[derive(Clone)]
pub struct SharedPool(Arc<DbPool>);

impl Deref for SharedPool {
    type Target = DbPool;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Registration, sessions and accounts
    pub auth: Arc<AuthServiceImpl>,
    pub graph: Arc<SocialGraph<Repositories>>,
    pub engagement: Arc<Engagement<Repositories>>,
    pub feed: Arc<FeedAssembler<Repositories>>,
    pub activity: Arc<ActivityLog<Repositories>>,
    pub profiles: Arc<ProfileService<Repositories>>,
    /// Database connection pool (shared reference for health checks)
    pub pool: SharedPool,
    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Wire every service over one pool
    pub fn new(
        pool: DbPool,
        config: Config,
        notifier: Arc<dyn Notifier>,
        blobs: Arc<dyn BlobStore>,
    ) -> Self {
        let repos = Arc::new(Repositories::new(pool.clone()));

        let auth = AuthService::new(
            config.auth.clone(),
            Arc::new(repos.users.clone()),
            Arc::new(repos.refresh_sessions.clone()),
            Arc::new(repos.verification_sessions.clone()),
            notifier,
        );

        Self {
            auth: Arc::new(auth),
            graph: Arc::new(SocialGraph::new(repos.clone())),
            engagement: Arc::new(Engagement::new(repos.clone())),
            feed: Arc::new(FeedAssembler::new(repos.clone(), blobs.clone())),
            activity: Arc::new(ActivityLog::new(repos.clone())),
            profiles: Arc::new(ProfileService::new(repos, blobs)),
            pool: SharedPool(Arc::new(pool)),
            config: Arc::new(config),
        }
    }
}
