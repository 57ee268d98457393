//! Authentication handlers (register, verify, login, refresh, logout)

use axum::extract::{Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{AppendHeaders, IntoResponse};
use axum::Json;
use serde::{Deserialize, Serialize};

use agora_auth_core::AuthError;
use agora_types::{TokenPair, UserId};

use crate::error::{ApiError, ApiResult};
use crate::extractors::{
    cookie_value, expired_cookie, token_cookie, AuthUser, ACCESS_COOKIE, REFRESH_COOKIE,
};
use crate::handlers::users::UserInfo;
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct VerifyQuery {
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct VerifyResponse {
    pub user_id: UserId,
    pub verified: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    pub success: bool,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<CredentialsRequest>,
) -> ApiResult<(StatusCode, Json<UserInfo>)> {
    if !req.email.contains('@') || req.password.is_empty() {
        return Err(ApiError::BadRequest(
            "email and password are required".to_string(),
        ));
    }

    let user = state.auth.register(req.email.trim(), &req.password).await?;
    Ok((StatusCode::CREATED, Json(UserInfo::from(user))))
}

/// GET /auth/verify-email?token=
pub async fn verify_email(
    State(state): State<AppState>,
    Query(query): Query<VerifyQuery>,
) -> ApiResult<Json<VerifyResponse>> {
    let user_id = state.auth.verify_email(&query.token).await?;
    Ok(Json(VerifyResponse {
        user_id,
        verified: true,
    }))
}

/// POST /auth/login
///
/// Issue a token pair, returned in the body and as cookies
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<CredentialsRequest>,
) -> ApiResult<impl IntoResponse> {
    let tokens = state.auth.login(req.email.trim(), &req.password).await?;
    Ok(with_token_cookies(&state, tokens))
}

/// POST /auth/refresh
///
/// Rotate the refresh token from the cookie, or from the body when no
/// cookie is present
pub async fn refresh(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Option<Json<RefreshRequest>>,
) -> ApiResult<impl IntoResponse> {
    let token = refresh_token(&headers, body).ok_or(AuthError::TokenAbsent)?;
    let tokens = state.auth.refresh(&token).await?;
    Ok(with_token_cookies(&state, tokens))
}

/// POST /auth/logout
pub async fn logout(
    State(state): State<AppState>,
    _user: AuthUser,
    headers: HeaderMap,
    body: Option<Json<RefreshRequest>>,
) -> ApiResult<impl IntoResponse> {
    if let Some(token) = refresh_token(&headers, body) {
        state.auth.logout(&token).await?;
    }

    Ok((cleared_cookies(), Json(LogoutResponse { success: true })))
}

// ============================================================================
// Helpers
// ============================================================================

fn refresh_token(headers: &HeaderMap, body: Option<Json<RefreshRequest>>) -> Option<String> {
    cookie_value(headers, REFRESH_COOKIE).or_else(|| {
        body.and_then(|Json(req)| req.refresh_token)
            .filter(|t| !t.is_empty())
    })
}

fn with_token_cookies(state: &AppState, tokens: TokenPair) -> impl IntoResponse {
    let config = &state.config.auth;
    let cookies = AppendHeaders([
        (
            header::SET_COOKIE,
            token_cookie(ACCESS_COOKIE, &tokens.access_token, config.access_token_ttl),
        ),
        (
            header::SET_COOKIE,
            token_cookie(REFRESH_COOKIE, &tokens.refresh_token, config.refresh_token_ttl),
        ),
    ]);
    (cookies, Json(tokens))
}

pub(crate) fn cleared_cookies() -> AppendHeaders<[(header::HeaderName, String); 2]> {
    AppendHeaders([
        (header::SET_COOKIE, expired_cookie(ACCESS_COOKIE)),
        (header::SET_COOKIE, expired_cookie(REFRESH_COOKIE)),
    ])
}
