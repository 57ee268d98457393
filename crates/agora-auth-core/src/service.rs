//! Auth service - ties together the token codec, session lifecycle and
//! account management

use agora_db::{
    CreateUser, DbError, RefreshSessionRepository, UpdateProfile, UserRepository, UserRow,
    VerificationSessionRepository,
};
use agora_types::{Gender, TokenPair, UserId};
use chrono::Utc;
use std::sync::Arc;

use crate::{
    config::AuthConfig,
    crypto::{hash_password, verify_password},
    notifier::Notifier,
    session::{RefreshSessions, SessionState, VerificationSessions},
    token::TokenCodec,
    AuthError,
};

/// User resolved from a valid access token
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user: UserRow,
}

impl AuthenticatedUser {
    pub fn user_id(&self) -> UserId {
        self.user.user_id()
    }

    /// Fail with `InactiveUser` unless the account is active
    pub fn require_active(&self) -> Result<(), AuthError> {
        if self.user.is_active {
            Ok(())
        } else {
            Err(AuthError::InactiveUser)
        }
    }

    /// Fail unless the account is an active superuser
    pub fn require_superuser(&self) -> Result<(), AuthError> {
        self.require_active()?;
        if self.user.is_superuser {
            Ok(())
        } else {
            Err(AuthError::NotSuperuser)
        }
    }
}

/// Profile and password changes; `None` leaves a field untouched
#[derive(Debug, Clone, Default)]
pub struct AccountChanges {
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub gender: Option<Gender>,
    pub password: Option<String>,
}

/// Rows removed by [`AuthService::sweep_expired`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub refresh_sessions: u64,
    pub unverified_users: u64,
}

/// Authentication service
///
/// Provides a single interface for:
/// - Registration with email verification
/// - Login, refresh rotation and logout
/// - Access token authentication
/// - Account updates and deletion
pub struct AuthService<U, R, V>
where
    U: UserRepository,
    R: RefreshSessionRepository,
    V: VerificationSessionRepository,
{
    config: AuthConfig,
    codec: TokenCodec,
    users: Arc<U>,
    refresh_sessions: RefreshSessions<R>,
    verification_sessions: VerificationSessions<V>,
    notifier: Arc<dyn Notifier>,
}

impl<U, R, V> AuthService<U, R, V>
where
    U: UserRepository,
    R: RefreshSessionRepository,
    V: VerificationSessionRepository,
{
    /// Create a new auth service
    pub fn new(
        config: AuthConfig,
        users: Arc<U>,
        refresh_repo: Arc<R>,
        verification_repo: Arc<V>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            codec: TokenCodec::new(&config),
            refresh_sessions: RefreshSessions::new(refresh_repo, config.refresh_token_ttl),
            verification_sessions: VerificationSessions::new(
                verification_repo,
                config.verification_ttl,
            ),
            users,
            notifier,
            config,
        }
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Access token codec
    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    // =========================================================================
    // Registration and Verification
    // =========================================================================

    /// Register a new account and dispatch its verification token
    pub async fn register(&self, email: &str, password: &str) -> Result<UserRow, AuthError> {
        if self.users.find_by_email(email).await?.is_some() {
            return Err(AuthError::UserAlreadyExists);
        }

        let hashed_password = hash_password(password, self.config.bcrypt_cost).await?;
        let (token, verification) = self.verification_sessions.prepare();

        let user = self
            .users
            .create_with_verification(
                CreateUser {
                    id: UserId::new().0,
                    email: email.to_string(),
                    hashed_password,
                },
                verification,
            )
            .await?;

        self.notifier.enqueue(&user.email, &token);
        tracing::info!(user_id = %user.id, "user registered");

        Ok(user)
    }

    /// Consume a verification token.
    ///
    /// An expired token purges the pending account and fails with
    /// `VerificationExpired`.
    pub async fn verify_email(&self, token: &str) -> Result<UserId, AuthError> {
        let now = Utc::now();
        let session = self.verification_sessions.find(token).await?;

        if self.users.find_by_id(session.user_id).await?.is_none() {
            return Err(AuthError::NotVerified);
        }

        match SessionState::of(&session, now) {
            SessionState::Expired => {
                self.verification_sessions.purge(&session).await?;
                Err(AuthError::VerificationExpired)
            }
            SessionState::Active => {
                self.verification_sessions.confirm(&session).await?;
                Ok(session.user_id())
            }
        }
    }

    // =========================================================================
    // Sessions
    // =========================================================================

    /// Exchange credentials for a token pair
    pub async fn login(&self, email: &str, password: &str) -> Result<TokenPair, AuthError> {
        let user = self
            .users
            .find_by_email(email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !verify_password(password, &user.hashed_password).await? {
            tracing::debug!(user_id = %user.id, "password mismatch");
            return Err(AuthError::InvalidCredentials);
        }
        if !user.is_verified {
            return Err(AuthError::NotVerified);
        }

        let refresh_token = self.refresh_sessions.open(user.user_id()).await?;
        tracing::info!(user_id = %user.id, "user logged in");

        self.token_pair(user.user_id(), refresh_token)
    }

    /// Rotate a refresh token and issue a new pair
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AuthError> {
        let (user_id, new_refresh_token) = self
            .refresh_sessions
            .rotate(refresh_token, Utc::now())
            .await?;

        self.token_pair(user_id, new_refresh_token)
    }

    /// End the session behind a refresh token; unknown tokens are ignored
    pub async fn logout(&self, refresh_token: &str) -> Result<(), AuthError> {
        self.refresh_sessions.close(refresh_token).await?;
        Ok(())
    }

    /// Resolve the user behind an access token
    pub async fn authenticate(&self, access_token: &str) -> Result<AuthenticatedUser, AuthError> {
        let claims = self.codec.verify(access_token)?;
        if claims.is_expired_at(Utc::now()) {
            return Err(AuthError::TokenExpired);
        }

        let user = self
            .users
            .find_by_id(claims.subject()?.0)
            .await?
            .ok_or(AuthError::UserNotPresent)?;
        if !user.is_verified {
            return Err(AuthError::NotVerified);
        }

        Ok(AuthenticatedUser { user })
    }

    /// Remove expired refresh sessions and expired pending accounts
    pub async fn sweep_expired(&self) -> Result<SweepReport, AuthError> {
        let report = SweepReport {
            refresh_sessions: self.refresh_sessions.sweep().await?,
            unverified_users: self.verification_sessions.sweep().await?,
        };

        if report != SweepReport::default() {
            tracing::info!(
                refresh_sessions = report.refresh_sessions,
                unverified_users = report.unverified_users,
                "expired sessions swept"
            );
        }
        Ok(report)
    }

    fn token_pair(&self, user_id: UserId, refresh_token: String) -> Result<TokenPair, AuthError> {
        let access_token = self.codec.issue_access_token(user_id, Utc::now())?;

        Ok(TokenPair::bearer(
            access_token,
            refresh_token,
            self.config.access_token_ttl.as_secs(),
            self.config.refresh_token_ttl.as_secs(),
        ))
    }

    // =========================================================================
    // Account Management
    // =========================================================================

    /// Apply profile and password changes
    pub async fn update_account(
        &self,
        user_id: UserId,
        changes: AccountChanges,
    ) -> Result<UserRow, AuthError> {
        if let Some(username) = changes.username.as_deref() {
            if let Some(owner) = self.users.find_by_username(username).await? {
                if owner.id != user_id.0 {
                    return Err(AuthError::UsernameTaken);
                }
            }
        }

        let hashed_password = match changes.password.as_deref() {
            Some(password) => Some(hash_password(password, self.config.bcrypt_cost).await?),
            None => None,
        };

        let profile = UpdateProfile {
            username: changes.username,
            first_name: changes.first_name,
            last_name: changes.last_name,
            description: changes.description,
            location: changes.location,
            gender: changes.gender.map(|g| g.as_str().to_string()),
            hashed_password,
        };

        let user = self
            .users
            .update_profile(user_id.0, profile)
            .await
            .map_err(|e| match e {
                DbError::Conflict(_) => AuthError::UsernameTaken,
                other => AuthError::from(other),
            })?
            .ok_or(AuthError::UserNotFound)?;

        tracing::info!(user_id = %user_id, "account updated");
        Ok(user)
    }

    /// Log out the given session and delete the account
    pub async fn delete_account(
        &self,
        user_id: UserId,
        refresh_token: Option<&str>,
    ) -> Result<(), AuthError> {
        if self.users.find_by_id(user_id.0).await?.is_none() {
            return Err(AuthError::UserNotFound);
        }
        if let Some(token) = refresh_token {
            self.refresh_sessions.close(token).await?;
        }

        self.users.delete(user_id.0).await?;
        tracing::info!(user_id = %user_id, "account deleted");
        Ok(())
    }

    /// List every account; superusers only
    pub async fn list_users(&self, caller: &AuthenticatedUser) -> Result<Vec<UserRow>, AuthError> {
        caller.require_superuser()?;
        Ok(self.users.find_all().await?)
    }
}

impl<U, R, V> std::fmt::Debug for AuthService<U, R, V>
where
    U: UserRepository,
    R: RefreshSessionRepository,
    V: VerificationSessionRepository,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthService")
            .field("config", &self.config)
            .finish()
    }
}
