//! Common test utilities for agora-auth-core integration tests

pub mod mock_repos;

#[allow(unused_imports)]
pub use mock_repos::{
    MockRefreshSessionRepository, MockTables, MockUserRepository,
    MockVerificationSessionRepository, RecordingNotifier,
};
