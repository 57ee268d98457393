//! Error taxonomy shared by every service layer

use serde::{Deserialize, Serialize};

/// Coarse error classification that callers (HTTP, CLI, tests) map to
/// their own status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// User, post, hashtag or session absent
    NotFound,
    /// Duplicate registration
    Conflict,
    /// Bad credentials; malformed, expired or absent token
    Unauthorized,
    /// Inactive, unverified or non-superuser caller
    Forbidden,
    /// Underlying store failure
    InternalFailure,
}

impl ErrorKind {
    /// HTTP status code equivalent
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::NotFound => 404,
            Self::Conflict => 409,
            Self::Unauthorized => 401,
            Self::Forbidden => 403,
            Self::InternalFailure => 500,
        }
    }
}
