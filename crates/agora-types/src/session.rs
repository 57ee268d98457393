//! Session and token types

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique session identifier (refresh or verification session row)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub Uuid);

impl SessionId {
    /// Create a new session ID
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for SessionId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

/// Token pair returned after login and refresh
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    /// Signed access token (short-lived)
    pub access_token: String,
    /// Opaque refresh token (long-lived, rotated on use)
    pub refresh_token: String,
    /// Access token lifetime in seconds
    pub access_expires_in: u64,
    /// Refresh token lifetime in seconds
    pub refresh_expires_in: u64,
    /// Token type (always "Bearer")
    pub token_type: String,
}

impl TokenPair {
    /// Build a bearer token pair
    pub fn bearer(
        access_token: String,
        refresh_token: String,
        access_expires_in: u64,
        refresh_expires_in: u64,
    ) -> Self {
        Self {
            access_token,
            refresh_token,
            access_expires_in,
            refresh_expires_in,
            token_type: "Bearer".to_string(),
        }
    }
}
