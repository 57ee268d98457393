//! Profile and follow handlers

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use agora_social_core::{ProfileView, UserSummary};
use agora_types::Outcome;

use crate::error::ApiResult;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// GET /profile/{username}
pub async fn get_profile(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> ApiResult<Json<ProfileView>> {
    Ok(Json(state.profiles.get_profile(&username).await?))
}

/// POST /profile/follow/{username}
pub async fn follow(
    State(state): State<AppState>,
    user: AuthUser,
    Path(username): Path<String>,
) -> ApiResult<(StatusCode, Json<Outcome>)> {
    let outcome = state.graph.follow(user.username()?, &username).await?;
    Ok((StatusCode::CREATED, Json(outcome)))
}

/// POST /profile/unfollow/{username}
pub async fn unfollow(
    State(state): State<AppState>,
    user: AuthUser,
    Path(username): Path<String>,
) -> ApiResult<(StatusCode, Json<Outcome>)> {
    let outcome = state.graph.unfollow(user.username()?, &username).await?;
    Ok((StatusCode::CREATED, Json(outcome)))
}

/// GET /profile/followers
pub async fn followers(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> ApiResult<Json<Vec<UserSummary>>> {
    Ok(Json(state.graph.followers(user.user_id()).await?))
}

/// GET /profile/following
pub async fn following(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> ApiResult<Json<Vec<UserSummary>>> {
    Ok(Json(state.graph.following(user.user_id()).await?))
}
