//! Common test utilities for agora-social-core integration tests

pub mod memory_store;

#[allow(unused_imports)]
pub use memory_store::{MemoryBlobStore, MemoryStore};
