//! Post, image and like handlers

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use agora_social_core::{ImageView, NewPost, PostView};
use agora_types::{ImageId, Outcome, PostId};

use crate::error::{ApiError, ApiResult};
use crate::extractors::AuthUser;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreatePostRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub image_id: Option<ImageId>,
}

impl From<CreatePostRequest> for NewPost {
    fn from(req: CreatePostRequest) -> Self {
        Self {
            title: req.title,
            content: req.content,
            image_id: req.image_id,
        }
    }
}

/// POST /posts
pub async fn create_post(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(req): Json<CreatePostRequest>,
) -> ApiResult<(StatusCode, Json<PostView>)> {
    let post = state.feed.create_post(user.user_id(), req.into()).await?;
    Ok((StatusCode::CREATED, Json(post)))
}

/// GET /posts
pub async fn own_posts(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> ApiResult<Json<Vec<PostView>>> {
    Ok(Json(state.feed.get_user_posts(user.user_id()).await?))
}

/// POST /posts/images
///
/// The request body is the raw image
pub async fn upload_image(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<ImageView>)> {
    if body.is_empty() {
        return Err(ApiError::BadRequest("image body is empty".to_string()));
    }

    let image = state.feed.upload_image(user.user_id(), &body).await?;
    Ok((StatusCode::CREATED, Json(image)))
}

/// POST /posts/{id}/like
pub async fn like(
    State(state): State<AppState>,
    user: AuthUser,
    Path(post_id): Path<Uuid>,
) -> ApiResult<Json<Outcome>> {
    let outcome = state
        .engagement
        .like(PostId(post_id), user.username()?)
        .await?;
    Ok(Json(outcome))
}

/// POST /posts/{id}/unlike
pub async fn unlike(
    State(state): State<AppState>,
    user: AuthUser,
    Path(post_id): Path<Uuid>,
) -> ApiResult<Json<Outcome>> {
    let outcome = state
        .engagement
        .unlike(PostId(post_id), user.username()?)
        .await?;
    Ok(Json(outcome))
}
