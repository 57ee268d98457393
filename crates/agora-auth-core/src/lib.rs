//! Agora Auth Core - Authentication business logic
//!
//! Access token signing and verification, refresh session rotation, the
//! email verification lifecycle and account management.

pub mod config;
pub mod crypto;
pub mod error;
pub mod notifier;
pub mod service;
pub mod session;
pub mod token;

pub use config::*;
pub use crypto::*;
pub use error::*;
pub use notifier::*;
pub use service::*;
pub use session::*;
pub use token::*;
