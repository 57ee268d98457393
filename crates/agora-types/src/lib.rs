//! Agora Types - Shared domain types
//!
//! This crate contains domain types used across Agora crates:
//! - User identity and profile enums
//! - Session and token types
//! - Post, image and hashtag identifiers
//! - The unified operation outcome and the error taxonomy

pub mod error;
pub mod outcome;
pub mod post;
pub mod session;
pub mod user;

pub use error::*;
pub use outcome::*;
pub use post::*;
pub use session::*;
pub use user::*;
