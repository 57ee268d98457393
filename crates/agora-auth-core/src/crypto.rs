//! Password hashing and opaque token helpers

use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::AuthError;

/// Generate an opaque refresh or verification token
pub fn generate_token() -> String {
    Uuid::new_v4().to_string()
}

/// Hash an opaque token for storage.
///
/// Only the SHA-256 hex digest is persisted; lookups hash the presented
/// token and compare digests.
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

/// Hash a password with bcrypt on the blocking pool
pub async fn hash_password(password: &str, cost: u32) -> Result<String, AuthError> {
    let password = password.to_owned();
    tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "password hashing task failed");
            AuthError::Internal
        })?
        .map_err(|e| {
            tracing::error!(error = %e, "password hashing failed");
            AuthError::Internal
        })
}

/// Check a password against a stored bcrypt hash.
///
/// A stored hash that cannot be parsed counts as a mismatch.
pub async fn verify_password(password: &str, hashed: &str) -> Result<bool, AuthError> {
    let password = password.to_owned();
    let hashed = hashed.to_owned();
    let verified = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hashed))
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "password verification task failed");
            AuthError::Internal
        })?;

    match verified {
        Ok(matches) => Ok(matches),
        Err(e) => {
            tracing::warn!(error = %e, "stored password hash is unreadable");
            Ok(false)
        }
    }
}
