//! Social errors

use agora_types::ErrorKind;
use thiserror::Error;

use crate::blob::BlobError;

/// Social graph, engagement and feed errors
#[derive(Error, Debug)]
pub enum SocialError {
    /// User not found
    #[error("user not found")]
    UserNotFound,

    /// Post not found
    #[error("post not found")]
    PostNotFound,

    /// Hashtag not found
    #[error("hashtag not found")]
    HashtagNotFound,

    /// Store failure (details are logged, never returned)
    #[error("storage failure")]
    Storage,

    /// Blob store failure
    #[error("file storage failure")]
    Blob(#[source] BlobError),
}

impl SocialError {
    /// Taxonomy kind of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UserNotFound | Self::PostNotFound | Self::HashtagNotFound => ErrorKind::NotFound,
            Self::Storage | Self::Blob(_) => ErrorKind::InternalFailure,
        }
    }

    /// Get HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        self.kind().status_code()
    }

    /// Get error code for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::PostNotFound => "POST_NOT_FOUND",
            Self::HashtagNotFound => "HASHTAG_NOT_FOUND",
            Self::Storage => "STORAGE_ERROR",
            Self::Blob(_) => "FILE_STORAGE_ERROR",
        }
    }
}

impl From<agora_db::DbError> for SocialError {
    fn from(err: agora_db::DbError) -> Self {
        tracing::error!(error = %err, "database error");
        Self::Storage
    }
}

impl From<BlobError> for SocialError {
    fn from(err: BlobError) -> Self {
        tracing::error!(error = %err, "blob store error");
        Self::Blob(err)
    }
}
