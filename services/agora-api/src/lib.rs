//! Agora API
//!
//! HTTP surface over the auth and social cores.

pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod state;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

pub use config::{Config, ConfigError};
pub use error::{ApiError, ApiResult};
pub use state::AppState;

/// Largest accepted request body (image uploads)
pub const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Build the application router
pub fn router(state: AppState) -> Router {
    let auth = Router::new()
        .route("/register", post(handlers::register))
        .route("/login", post(handlers::login))
        .route("/refresh", post(handlers::refresh))
        .route("/logout", post(handlers::logout))
        .route("/verify-email", get(handlers::verify_email));

    let users = Router::new()
        .route("/", get(handlers::list_users))
        .route(
            "/me",
            get(handlers::me)
                .put(handlers::update_me)
                .delete(handlers::delete_me),
        )
        .route("/me/image", post(handlers::upload_avatar));

    let profile = Router::new()
        .route("/followers", get(handlers::followers))
        .route("/following", get(handlers::following))
        .route("/follow/:username", post(handlers::follow))
        .route("/unfollow/:username", post(handlers::unfollow))
        .route("/:username", get(handlers::get_profile));

    let posts = Router::new()
        .route("/", get(handlers::own_posts).post(handlers::create_post))
        .route("/images", post(handlers::upload_image))
        .route("/:id/like", post(handlers::like))
        .route("/:id/unlike", post(handlers::unlike));

    Router::new()
        .route("/health", get(handlers::health))
        .route("/ready", get(handlers::ready))
        .nest("/auth", auth)
        .nest("/users", users)
        .nest("/profile", profile)
        .nest("/posts", posts)
        .route("/feed", get(handlers::get_feed))
        .route("/hashtags/:name/posts", get(handlers::hashtag_posts))
        .route("/activity/:username", get(handlers::activity))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
