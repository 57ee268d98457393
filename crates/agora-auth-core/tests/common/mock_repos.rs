//! Mock repositories for testing
//!
//! All three repositories share one set of tables so that multi-table
//! writes (registration, confirmation, purge) behave like the PostgreSQL
//! transactions they stand in for.

use agora_auth_core::{Notifier, VerificationMessage};
use agora_db::{
    CreateRefreshSession, CreateUser, CreateVerificationSession, DbError, DbResult,
    RefreshSessionRepository, RefreshSessionRow, SessionWindow, UpdateProfile, UserRepository,
    UserRow, VerificationSessionRepository, VerificationSessionRow,
};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use dashmap::{DashMap, DashSet};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// Shared in-memory tables
#[derive(Default, Clone)]
pub struct MockTables {
    pub users: Arc<DashMap<Uuid, UserRow>>,
    pub refresh_sessions: Arc<DashMap<Uuid, RefreshSessionRow>>,
    pub verification_sessions: Arc<DashMap<Uuid, VerificationSessionRow>>,
    /// (follower_id, following_id)
    pub follows: Arc<DashSet<(Uuid, Uuid)>>,
    write_lock: Arc<Mutex<()>>,
}

#[allow(dead_code)]
impl MockTables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn user_repo(&self) -> Arc<MockUserRepository> {
        Arc::new(MockUserRepository {
            tables: self.clone(),
        })
    }

    pub fn refresh_repo(&self) -> Arc<MockRefreshSessionRepository> {
        Arc::new(MockRefreshSessionRepository {
            tables: self.clone(),
        })
    }

    pub fn verification_repo(&self) -> Arc<MockVerificationSessionRepository> {
        Arc::new(MockVerificationSessionRepository {
            tables: self.clone(),
        })
    }

    /// Build a user row with the given state
    pub fn user_row(email: &str, hashed_password: &str) -> UserRow {
        UserRow {
            id: Uuid::now_v7(),
            email: email.to_string(),
            hashed_password: hashed_password.to_string(),
            username: None,
            first_name: None,
            last_name: None,
            description: None,
            location: None,
            gender: "male".to_string(),
            image: None,
            is_active: true,
            is_verified: false,
            is_superuser: false,
            followers_count: 0,
            following_count: 0,
            created_at: Utc::now(),
        }
    }

    /// Insert a user directly
    pub fn insert_user(&self, user: UserRow) {
        self.users.insert(user.id, user);
    }

    pub fn find_user_by_email(&self, email: &str) -> Option<UserRow> {
        self.users
            .iter()
            .find(|u| u.email == email)
            .map(|u| u.value().clone())
    }

    /// Change a user row in place
    pub fn modify_user(&self, id: Uuid, f: impl FnOnce(&mut UserRow)) {
        if let Some(mut user) = self.users.get_mut(&id) {
            f(&mut user);
        }
    }

    /// Move every refresh session's window `by` into the past
    pub fn backdate_refresh_sessions(&self, by: Duration) {
        for mut session in self.refresh_sessions.iter_mut() {
            session.created_at = session.created_at - by;
        }
    }

    /// Move every verification session's window `by` into the past
    pub fn backdate_verification_sessions(&self, by: Duration) {
        for mut session in self.verification_sessions.iter_mut() {
            session.created_at = session.created_at - by;
        }
    }

    pub fn refresh_sessions_for(&self, user_id: Uuid) -> usize {
        self.refresh_sessions
            .iter()
            .filter(|s| s.user_id == user_id)
            .count()
    }

    /// Insert a follow edge and bump both counters
    pub fn follow(&self, follower_id: Uuid, following_id: Uuid) {
        if self.follows.insert((follower_id, following_id)) {
            self.modify_user(follower_id, |u| u.following_count += 1);
            self.modify_user(following_id, |u| u.followers_count += 1);
        }
    }

    /// Callers hold `write_lock`
    fn delete_user(&self, id: Uuid) {
        let edges: Vec<(Uuid, Uuid)> = self
            .follows
            .iter()
            .filter(|e| e.0 == id || e.1 == id)
            .map(|e| *e)
            .collect();
        for (follower, following) in edges {
            self.follows.remove(&(follower, following));
            if follower == id {
                self.modify_user(following, |u| {
                    u.followers_count = (u.followers_count - 1).max(0)
                });
            } else {
                self.modify_user(follower, |u| {
                    u.following_count = (u.following_count - 1).max(0)
                });
            }
        }

        self.users.remove(&id);
        self.refresh_sessions.retain(|_, s| s.user_id != id);
        self.verification_sessions.retain(|_, s| s.user_id != id);
    }
}

/// In-memory user repository for testing
#[derive(Clone)]
pub struct MockUserRepository {
    tables: MockTables,
}

#[async_trait]
impl UserRepository for MockUserRepository {
    async fn find_by_id(&self, id: Uuid) -> DbResult<Option<UserRow>> {
        Ok(self.tables.users.get(&id).map(|r| r.value().clone()))
    }

    async fn find_by_email(&self, email: &str) -> DbResult<Option<UserRow>> {
        Ok(self.tables.find_user_by_email(email))
    }

    async fn find_by_username(&self, username: &str) -> DbResult<Option<UserRow>> {
        Ok(self
            .tables
            .users
            .iter()
            .find(|u| u.username.as_deref() == Some(username))
            .map(|u| u.value().clone()))
    }

    async fn find_all(&self) -> DbResult<Vec<UserRow>> {
        let mut users: Vec<UserRow> = self.tables.users.iter().map(|u| u.value().clone()).collect();
        users.sort_by_key(|u| u.created_at);
        Ok(users)
    }

    async fn create_with_verification(
        &self,
        user: CreateUser,
        verification: CreateVerificationSession,
    ) -> DbResult<UserRow> {
        let _guard = self.tables.write_lock.lock().unwrap();

        if self.tables.find_user_by_email(&user.email).is_some() {
            return Err(DbError::Conflict("users_email_key".to_string()));
        }

        let mut row = MockTables::user_row(&user.email, &user.hashed_password);
        row.id = user.id;
        self.tables.users.insert(row.id, row.clone());
        self.tables.verification_sessions.insert(
            verification.id,
            VerificationSessionRow {
                id: verification.id,
                user_id: row.id,
                token_hash: verification.token_hash,
                expires_in: verification.expires_in,
                created_at: Utc::now(),
            },
        );

        Ok(row)
    }

    async fn update_profile(&self, id: Uuid, profile: UpdateProfile) -> DbResult<Option<UserRow>> {
        let _guard = self.tables.write_lock.lock().unwrap();

        if let Some(username) = profile.username.as_deref() {
            let taken = self
                .tables
                .users
                .iter()
                .any(|u| u.id != id && u.username.as_deref() == Some(username));
            if taken {
                return Err(DbError::Conflict("users_username_key".to_string()));
            }
        }

        let Some(mut user) = self.tables.users.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(v) = profile.username {
            user.username = Some(v);
        }
        if let Some(v) = profile.first_name {
            user.first_name = Some(v);
        }
        if let Some(v) = profile.last_name {
            user.last_name = Some(v);
        }
        if let Some(v) = profile.description {
            user.description = Some(v);
        }
        if let Some(v) = profile.location {
            user.location = Some(v);
        }
        if let Some(v) = profile.gender {
            user.gender = v;
        }
        if let Some(v) = profile.hashed_password {
            user.hashed_password = v;
        }

        Ok(Some(user.clone()))
    }

    async fn update_image(&self, id: Uuid, image: &str) -> DbResult<()> {
        self.tables
            .modify_user(id, |u| u.image = Some(image.to_string()));
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> DbResult<()> {
        let _guard = self.tables.write_lock.lock().unwrap();
        self.tables.delete_user(id);
        Ok(())
    }
}

/// In-memory refresh session repository for testing
#[derive(Clone)]
pub struct MockRefreshSessionRepository {
    tables: MockTables,
}

#[async_trait]
impl RefreshSessionRepository for MockRefreshSessionRepository {
    async fn create(&self, session: CreateRefreshSession) -> DbResult<RefreshSessionRow> {
        let row = RefreshSessionRow {
            id: session.id,
            user_id: session.user_id,
            token_hash: session.token_hash,
            expires_in: session.expires_in,
            created_at: Utc::now(),
        };
        self.tables.refresh_sessions.insert(row.id, row.clone());
        Ok(row)
    }

    async fn find_by_token_hash(&self, token_hash: &str) -> DbResult<Option<RefreshSessionRow>> {
        Ok(self
            .tables
            .refresh_sessions
            .iter()
            .find(|s| s.token_hash == token_hash)
            .map(|s| s.value().clone()))
    }

    async fn find_by_user_id(&self, user_id: Uuid) -> DbResult<Vec<RefreshSessionRow>> {
        Ok(self
            .tables
            .refresh_sessions
            .iter()
            .filter(|s| s.user_id == user_id)
            .map(|s| s.value().clone())
            .collect())
    }

    async fn rotate(
        &self,
        id: Uuid,
        old_token_hash: &str,
        new_token_hash: &str,
        expires_in: i64,
        now: DateTime<Utc>,
    ) -> DbResult<bool> {
        match self.tables.refresh_sessions.get_mut(&id) {
            Some(mut session) if session.token_hash == old_token_hash => {
                session.token_hash = new_token_hash.to_string();
                session.expires_in = expires_in;
                session.created_at = now;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn delete(&self, id: Uuid) -> DbResult<bool> {
        Ok(self.tables.refresh_sessions.remove(&id).is_some())
    }

    async fn delete_by_token_hash(&self, token_hash: &str) -> DbResult<bool> {
        let before = self.tables.refresh_sessions.len();
        self.tables
            .refresh_sessions
            .retain(|_, s| s.token_hash != token_hash);
        Ok(self.tables.refresh_sessions.len() < before)
    }

    async fn delete_expired(&self) -> DbResult<u64> {
        let now = Utc::now();
        let before = self.tables.refresh_sessions.len();
        self.tables
            .refresh_sessions
            .retain(|_, s| !s.is_expired_at(now));
        Ok((before - self.tables.refresh_sessions.len()) as u64)
    }
}

/// In-memory verification session repository for testing
#[derive(Clone)]
pub struct MockVerificationSessionRepository {
    tables: MockTables,
}

#[async_trait]
impl VerificationSessionRepository for MockVerificationSessionRepository {
    async fn find_by_token_hash(
        &self,
        token_hash: &str,
    ) -> DbResult<Option<VerificationSessionRow>> {
        Ok(self
            .tables
            .verification_sessions
            .iter()
            .find(|s| s.token_hash == token_hash)
            .map(|s| s.value().clone()))
    }

    async fn confirm(&self, session_id: Uuid, user_id: Uuid) -> DbResult<bool> {
        let _guard = self.tables.write_lock.lock().unwrap();

        if self.tables.verification_sessions.remove(&session_id).is_none() {
            return Ok(false);
        }
        self.tables.modify_user(user_id, |u| u.is_verified = true);
        Ok(true)
    }

    async fn purge(&self, session_id: Uuid, user_id: Uuid) -> DbResult<()> {
        let _guard = self.tables.write_lock.lock().unwrap();

        self.tables.verification_sessions.remove(&session_id);
        let unverified = self
            .tables
            .users
            .get(&user_id)
            .is_some_and(|u| !u.is_verified);
        if unverified {
            self.tables.delete_user(user_id);
        }
        Ok(())
    }

    async fn purge_expired(&self) -> DbResult<u64> {
        let _guard = self.tables.write_lock.lock().unwrap();
        let now = Utc::now();

        let expired: Vec<(Uuid, Uuid)> = self
            .tables
            .verification_sessions
            .iter()
            .filter(|s| s.is_expired_at(now))
            .map(|s| (s.id, s.user_id))
            .collect();

        let mut purged = 0;
        for (session_id, user_id) in expired {
            self.tables.verification_sessions.remove(&session_id);
            let unverified = self
                .tables
                .users
                .get(&user_id)
                .is_some_and(|u| !u.is_verified);
            if unverified {
                self.tables.delete_user(user_id);
                purged += 1;
            }
        }
        Ok(purged)
    }
}

/// Notifier that records every enqueued message
#[derive(Default, Clone)]
pub struct RecordingNotifier {
    sent: Arc<Mutex<Vec<VerificationMessage>>>,
}

#[allow(dead_code)]
impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Latest token sent to `recipient`
    pub fn token_for(&self, recipient: &str) -> Option<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|m| m.recipient == recipient)
            .map(|m| m.token.clone())
    }

    pub fn count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

impl Notifier for RecordingNotifier {
    fn enqueue(&self, recipient: &str, token: &str) {
        self.sent.lock().unwrap().push(VerificationMessage {
            recipient: recipient.to_string(),
            token: token.to_string(),
        });
    }
}
