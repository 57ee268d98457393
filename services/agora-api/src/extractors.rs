//! Axum extractors and cookie helpers for authentication

use std::time::Duration;

use async_trait::async_trait;
use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use axum::http::{header, HeaderMap};

use agora_auth_core::{AuthError, AuthenticatedUser};

use crate::error::ApiError;
use crate::state::AppState;

pub const ACCESS_COOKIE: &str = "access_token";
pub const REFRESH_COOKIE: &str = "refresh_token";

/// Active, verified user behind the request's access token
#[derive(Debug, Clone)]
pub struct AuthUser(pub AuthenticatedUser);

impl AuthUser {
    /// Username the social graph knows this caller by
    pub fn username(&self) -> Result<&str, ApiError> {
        self.0
            .user
            .username
            .as_deref()
            .filter(|name| !name.is_empty())
            .ok_or_else(|| ApiError::BadRequest("set a username first".to_string()))
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);

        let token = access_token(&parts.headers).ok_or(AuthError::TokenAbsent)?;

        let user = app_state.auth.authenticate(&token).await.map_err(|e| {
            tracing::debug!(error = %e, "access token rejected");
            e
        })?;
        user.require_active()?;

        Ok(AuthUser(user))
    }
}

/// Access token from `Authorization: Bearer` or the access cookie
pub fn access_token(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty());

    match bearer {
        Some(token) => Some(token.to_string()),
        None => cookie_value(headers, ACCESS_COOKIE),
    }
}

/// Value of a named cookie across all `Cookie` headers
pub fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, value)| *key == name && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

/// `Set-Cookie` value for an http-only token cookie
pub fn token_cookie(name: &str, value: &str, max_age: Duration) -> String {
    format!(
        "{name}={value}; HttpOnly; SameSite=Lax; Path=/; Max-Age={}",
        max_age.as_secs()
    )
}

/// `Set-Cookie` value that expires a cookie immediately
pub fn expired_cookie(name: &str) -> String {
    format!("{name}=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(header::HeaderName, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.append(name.clone(), HeaderValue::from_str(value).unwrap());
        }
        map
    }

    #[test]
    fn test_bearer_wins_over_cookie() {
        let map = headers(&[
            (header::AUTHORIZATION, "Bearer from-header"),
            (header::COOKIE, "access_token=from-cookie"),
        ]);
        assert_eq!(access_token(&map).as_deref(), Some("from-header"));
    }

    #[test]
    fn test_cookie_fallback() {
        let map = headers(&[
            (header::AUTHORIZATION, "Basic abc"),
            (header::COOKIE, "theme=dark; access_token=abc.def.ghi; refresh_token=r"),
        ]);
        assert_eq!(access_token(&map).as_deref(), Some("abc.def.ghi"));
        assert_eq!(cookie_value(&map, REFRESH_COOKIE).as_deref(), Some("r"));
    }

    #[test]
    fn test_cookie_across_headers() {
        let map = headers(&[
            (header::COOKIE, "a=1"),
            (header::COOKIE, "refresh_token=second"),
        ]);
        assert_eq!(cookie_value(&map, REFRESH_COOKIE).as_deref(), Some("second"));
    }

    #[test]
    fn test_missing_or_empty() {
        assert!(access_token(&HeaderMap::new()).is_none());
        let map = headers(&[(header::COOKIE, "access_token=; xaccess_token=1")]);
        assert!(access_token(&map).is_none());
    }

    #[test]
    fn test_cookie_attributes() {
        let cookie = token_cookie(ACCESS_COOKIE, "tok", Duration::from_secs(1800));
        assert_eq!(
            cookie,
            "access_token=tok; HttpOnly; SameSite=Lax; Path=/; Max-Age=1800"
        );
        assert!(expired_cookie(REFRESH_COOKIE).ends_with("Max-Age=0"));
    }
}
