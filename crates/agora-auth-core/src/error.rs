//! Auth errors

use agora_types::ErrorKind;
use thiserror::Error;

/// Authentication errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Unknown email or wrong password
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Email address has not been confirmed
    #[error("email not verified")]
    NotVerified,

    /// Refresh token does not match any session
    #[error("token absent")]
    TokenAbsent,

    /// Token or session lifetime has elapsed
    #[error("token expired")]
    TokenExpired,

    /// Access token signature or payload is invalid
    #[error("malformed token")]
    MalformedToken,

    /// Verification link expired; the pending account was removed
    #[error("verification expired")]
    VerificationExpired,

    /// Token subject no longer exists
    #[error("user not present")]
    UserNotPresent,

    /// Account is deactivated
    #[error("inactive user")]
    InactiveUser,

    /// Superuser privileges required
    #[error("superuser required")]
    NotSuperuser,

    /// Email already registered
    #[error("user already exists")]
    UserAlreadyExists,

    /// Username already taken by another account
    #[error("username taken")]
    UsernameTaken,

    /// User not found
    #[error("user not found")]
    UserNotFound,

    /// Store failure (details are logged, never returned)
    #[error("storage failure")]
    Storage,

    /// Password hashing or token signing failure
    #[error("internal failure")]
    Internal,
}

impl AuthError {
    /// Taxonomy kind of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidCredentials
            | Self::TokenAbsent
            | Self::TokenExpired
            | Self::MalformedToken
            | Self::VerificationExpired
            | Self::UserNotPresent => ErrorKind::Unauthorized,
            Self::NotVerified | Self::InactiveUser | Self::NotSuperuser => ErrorKind::Forbidden,
            Self::UserAlreadyExists | Self::UsernameTaken => ErrorKind::Conflict,
            Self::UserNotFound => ErrorKind::NotFound,
            Self::Storage | Self::Internal => ErrorKind::InternalFailure,
        }
    }

    /// Get HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        self.kind().status_code()
    }

    /// Get error code for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::NotVerified => "NOT_VERIFIED",
            Self::TokenAbsent => "TOKEN_ABSENT",
            Self::TokenExpired => "TOKEN_EXPIRED",
            Self::MalformedToken => "MALFORMED_TOKEN",
            Self::VerificationExpired => "VERIFICATION_EXPIRED",
            Self::UserNotPresent => "USER_NOT_PRESENT",
            Self::InactiveUser => "INACTIVE_USER",
            Self::NotSuperuser => "NOT_SUPERUSER",
            Self::UserAlreadyExists => "USER_ALREADY_EXISTS",
            Self::UsernameTaken => "USERNAME_TAKEN",
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::Storage => "STORAGE_ERROR",
            Self::Internal => "INTERNAL_ERROR",
        }
    }
}

impl From<agora_db::DbError> for AuthError {
    fn from(err: agora_db::DbError) -> Self {
        match err {
            agora_db::DbError::Conflict(constraint) => {
                tracing::debug!(%constraint, "unique constraint rejected write");
                Self::UserAlreadyExists
            }
            other => {
                tracing::error!(error = %other, "database error");
                Self::Storage
            }
        }
    }
}
