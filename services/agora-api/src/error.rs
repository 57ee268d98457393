//! Error types for the Agora API service.

use agora_auth_core::AuthError;
use agora_social_core::SocialError;
use agora_types::ErrorKind;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// API error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

/// API error type
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Social(#[from] SocialError),
}

impl ApiError {
    fn kind(&self) -> Option<ErrorKind> {
        match self {
            Self::BadRequest(_) => None,
            Self::Auth(e) => Some(e.kind()),
            Self::Social(e) => Some(e.kind()),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self.kind() {
            None => StatusCode::BAD_REQUEST,
            Some(kind) => StatusCode::from_u16(kind.status_code())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::Auth(e) => e.error_code(),
            Self::Social(e) => e.error_code(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Causes are logged where they are converted; only note the 500 here
        if self.kind() == Some(ErrorKind::InternalFailure) {
            tracing::error!(error = %self, "Internal API error");
        }

        let body = ErrorResponse {
            error: ErrorDetail {
                code: self.error_code().to_string(),
                message: self.to_string(),
            },
        };

        (status, Json(body)).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
