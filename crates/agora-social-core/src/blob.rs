//! File storage for uploaded images
//!
//! The services only see the relative path a [`BlobStore`] returns and
//! store it as an opaque column value.

use async_trait::async_trait;
use chrono::Utc;
use std::path::PathBuf;
use thiserror::Error;

/// Blob store errors
#[derive(Debug, Error)]
pub enum BlobError {
    #[error("invalid folder key: {0}")]
    InvalidKey(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Stores uploaded bytes and returns their relative path
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn store(&self, folder_key: &str, bytes: &[u8]) -> Result<String, BlobError>;
}

/// Blob store writing under a local media root
#[derive(Debug, Clone)]
pub struct LocalBlobStore {
    root: PathBuf,
}

impl LocalBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &std::path::Path {
        &self.root
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn store(&self, folder_key: &str, bytes: &[u8]) -> Result<String, BlobError> {
        let key = folder_key.trim_matches('/');
        if key.is_empty() || key.split('/').any(|part| part.is_empty() || part == "..") {
            return Err(BlobError::InvalidKey(folder_key.to_string()));
        }

        let folder = self.root.join(key);
        tokio::fs::create_dir_all(&folder).await?;

        let filename = format!(
            "{}_{}.{}",
            Utc::now().format("%Y%m%d%H%M%S%6f"),
            &uuid::Uuid::new_v4().simple().to_string()[..8],
            sniff_extension(bytes)
        );
        tokio::fs::write(folder.join(&filename), bytes).await?;

        tracing::debug!(folder = %key, %filename, size = bytes.len(), "blob stored");
        Ok(format!("/{key}/{filename}"))
    }
}

/// File extension guessed from the leading magic bytes
fn sniff_extension(bytes: &[u8]) -> &'static str {
    match bytes {
        [0x89, b'P', b'N', b'G', ..] => "png",
        [0xFF, 0xD8, 0xFF, ..] => "jpg",
        [b'G', b'I', b'F', b'8', ..] => "gif",
        [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => "webp",
        _ => "bin",
    }
}
