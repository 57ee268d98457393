//! Account handlers (me, update, delete, avatar, user list)

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use agora_auth_core::AccountChanges;
use agora_db::UserRow;
use agora_types::{Gender, UserId};

use crate::error::{ApiError, ApiResult};
use crate::extractors::{cookie_value, AuthUser, REFRESH_COOKIE};
use crate::handlers::auth::cleared_cookies;
use crate::state::AppState;

/// Public account fields
#[derive(Debug, Serialize)]
pub struct UserInfo {
    pub id: UserId,
    pub email: String,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub gender: Gender,
    pub image: Option<String>,
    pub is_active: bool,
    pub is_verified: bool,
    pub followers_count: i64,
    pub following_count: i64,
    pub created_at: DateTime<Utc>,
}

impl From<UserRow> for UserInfo {
    fn from(user: UserRow) -> Self {
        Self {
            id: user.user_id(),
            gender: user.gender(),
            email: user.email,
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
            description: user.description,
            location: user.location,
            image: user.image,
            is_active: user.is_active,
            is_verified: user.is_verified,
            followers_count: user.followers_count,
            following_count: user.following_count,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserRequest {
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub gender: Option<Gender>,
    pub password: Option<String>,
}

impl UpdateUserRequest {
    fn into_changes(self) -> Result<AccountChanges, ApiError> {
        if let Some(username) = &self.username {
            if username.trim().is_empty() || username.contains(char::is_whitespace) {
                return Err(ApiError::BadRequest("invalid username".to_string()));
            }
        }
        if self.password.as_deref() == Some("") {
            return Err(ApiError::BadRequest("password cannot be empty".to_string()));
        }

        Ok(AccountChanges {
            username: self.username,
            first_name: self.first_name,
            last_name: self.last_name,
            description: self.description,
            location: self.location,
            gender: self.gender,
            password: self.password,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct AvatarResponse {
    pub image: String,
}

/// GET /users/me
pub async fn me(AuthUser(user): AuthUser) -> Json<UserInfo> {
    Json(UserInfo::from(user.user))
}

/// PUT /users/me
pub async fn update_me(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(req): Json<UpdateUserRequest>,
) -> ApiResult<Json<UserInfo>> {
    let updated = state
        .auth
        .update_account(user.user_id(), req.into_changes()?)
        .await?;
    Ok(Json(UserInfo::from(updated)))
}

/// DELETE /users/me
pub async fn delete_me(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    headers: HeaderMap,
) -> ApiResult<impl IntoResponse> {
    let refresh_token = cookie_value(&headers, REFRESH_COOKIE);
    state
        .auth
        .delete_account(user.user_id(), refresh_token.as_deref())
        .await?;

    Ok((StatusCode::NO_CONTENT, cleared_cookies()))
}

/// POST /users/me/image
pub async fn upload_avatar(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<AvatarResponse>)> {
    if body.is_empty() {
        return Err(ApiError::BadRequest("image body is empty".to_string()));
    }

    let image = state.profiles.upload_avatar(user.user_id(), &body).await?;
    Ok((StatusCode::CREATED, Json(AvatarResponse { image })))
}

/// GET /users
pub async fn list_users(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> ApiResult<Json<Vec<UserInfo>>> {
    let users = state.auth.list_users(&user).await?;
    Ok(Json(users.into_iter().map(UserInfo::from).collect()))
}
