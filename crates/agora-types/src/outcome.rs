//! Unified result for idempotent state-machine operations
//!
//! Follow, unfollow, like and unlike either change state or do nothing.
//! "Nothing to do" is a successful outcome, never an error.

use serde::{Deserialize, Serialize};

/// Why an operation left state untouched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoopReason {
    /// The follow edge already exists
    AlreadyFollowing,
    /// There is no follow edge to remove
    NotFollowing,
    /// A user tried to follow themselves
    SelfFollow,
    /// The user already likes the post
    AlreadyLiked,
    /// The user does not like the post
    NotLiked,
}

impl std::fmt::Display for NoopReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::AlreadyFollowing => "already following",
            Self::NotFollowing => "not following",
            Self::SelfFollow => "cannot follow yourself",
            Self::AlreadyLiked => "already liked",
            Self::NotLiked => "not liked",
        };
        f.write_str(s)
    }
}

/// Outcome of an idempotent operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    /// Whether any state was written
    pub applied: bool,
    /// Set when `applied` is false
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<NoopReason>,
}

impl Outcome {
    /// State changed
    pub const fn applied() -> Self {
        Self {
            applied: true,
            reason: None,
        }
    }

    /// Nothing to do
    pub const fn noop(reason: NoopReason) -> Self {
        Self {
            applied: false,
            reason: Some(reason),
        }
    }

    pub const fn is_noop(&self) -> bool {
        !self.applied
    }
}
