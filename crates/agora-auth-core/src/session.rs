//! Refresh and verification session lifecycle
//!
//! A session row is ACTIVE while `now < created_at + expires_in`, EXPIRED
//! from then on, and CONSUMED once deleted. Expired rows are removed the
//! first time they are presented.

use agora_db::{
    CreateRefreshSession, CreateVerificationSession, RefreshSessionRepository, SessionWindow,
    VerificationSessionRepository, VerificationSessionRow,
};
use agora_types::{SessionId, UserId};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;

use crate::crypto::{generate_token, hash_token};
use crate::AuthError;

/// Observable state of a stored session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Active,
    Expired,
}

impl SessionState {
    /// State of a session row at `now`
    pub fn of(session: &impl SessionWindow, now: DateTime<Utc>) -> Self {
        if session.is_expired_at(now) {
            Self::Expired
        } else {
            Self::Active
        }
    }
}

fn ttl_secs(ttl: Duration) -> i64 {
    i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX)
}

/// Refresh session manager
pub struct RefreshSessions<R: RefreshSessionRepository> {
    repo: Arc<R>,
    ttl: Duration,
}

impl<R: RefreshSessionRepository> RefreshSessions<R> {
    pub fn new(repo: Arc<R>, ttl: Duration) -> Self {
        Self { repo, ttl }
    }

    /// Refresh session lifetime
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Open a new session for `user_id`, returning the raw refresh token
    pub async fn open(&self, user_id: UserId) -> Result<String, AuthError> {
        let token = generate_token();
        let session = self
            .repo
            .create(CreateRefreshSession {
                id: SessionId::new().0,
                user_id: user_id.0,
                token_hash: hash_token(&token),
                expires_in: ttl_secs(self.ttl),
            })
            .await?;

        tracing::debug!(session_id = %session.id, user_id = %user_id, "refresh session opened");
        Ok(token)
    }

    /// Swap `token` for a fresh one on the same session row.
    ///
    /// Returns the session owner and the new raw token. An expired session
    /// is deleted and reported as `TokenExpired`; losing a concurrent
    /// rotation of the same token is reported as `TokenAbsent`.
    pub async fn rotate(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<(UserId, String), AuthError> {
        let old_hash = hash_token(token);
        let session = self
            .repo
            .find_by_token_hash(&old_hash)
            .await?
            .ok_or(AuthError::TokenAbsent)?;

        if SessionState::of(&session, now) == SessionState::Expired {
            self.repo.delete(session.id).await?;
            tracing::info!(session_id = %session.id, "expired refresh session consumed");
            return Err(AuthError::TokenExpired);
        }

        let new_token = generate_token();
        let rotated = self
            .repo
            .rotate(
                session.id,
                &old_hash,
                &hash_token(&new_token),
                ttl_secs(self.ttl),
                now,
            )
            .await?;
        if !rotated {
            tracing::warn!(session_id = %session.id, "refresh token reused during rotation");
            return Err(AuthError::TokenAbsent);
        }

        tracing::info!(session_id = %session.id, user_id = %session.user_id, "refresh session rotated");
        Ok((session.user_id(), new_token))
    }

    /// Close the session behind `token`, if any
    pub async fn close(&self, token: &str) -> Result<bool, AuthError> {
        let deleted = self.repo.delete_by_token_hash(&hash_token(token)).await?;
        if deleted {
            tracing::info!("refresh session closed");
        }
        Ok(deleted)
    }

    /// Delete every expired session
    pub async fn sweep(&self) -> Result<u64, AuthError> {
        Ok(self.repo.delete_expired().await?)
    }
}

/// Email verification session manager
pub struct VerificationSessions<V: VerificationSessionRepository> {
    repo: Arc<V>,
    ttl: Duration,
}

impl<V: VerificationSessionRepository> VerificationSessions<V> {
    pub fn new(repo: Arc<V>, ttl: Duration) -> Self {
        Self { repo, ttl }
    }

    /// Prepare a session to be stored alongside a new user.
    ///
    /// Returns the raw token to deliver and the row input holding its hash.
    pub fn prepare(&self) -> (String, CreateVerificationSession) {
        let token = generate_token();
        let session = CreateVerificationSession {
            id: SessionId::new().0,
            token_hash: hash_token(&token),
            expires_in: ttl_secs(self.ttl),
        };
        (token, session)
    }

    /// Look up the session for a presented token
    pub async fn find(&self, token: &str) -> Result<VerificationSessionRow, AuthError> {
        self.repo
            .find_by_token_hash(&hash_token(token))
            .await?
            .ok_or(AuthError::NotVerified)
    }

    /// Delete the session and its unverified owner
    pub async fn purge(&self, session: &VerificationSessionRow) -> Result<(), AuthError> {
        self.repo.purge(session.id, session.user_id).await?;
        tracing::info!(user_id = %session.user_id, "unverified user purged");
        Ok(())
    }

    /// Consume the session and mark its owner verified
    pub async fn confirm(&self, session: &VerificationSessionRow) -> Result<(), AuthError> {
        if !self.repo.confirm(session.id, session.user_id).await? {
            return Err(AuthError::NotVerified);
        }
        tracing::info!(user_id = %session.user_id, "email verified");
        Ok(())
    }

    /// Purge every expired session with its unverified owner
    pub async fn sweep(&self) -> Result<u64, AuthError> {
        Ok(self.repo.purge_expired().await?)
    }
}
