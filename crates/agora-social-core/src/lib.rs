//! Agora Social Core - Social graph, engagement and feed logic
//!
//! Every service here is generic over a [`SocialStore`], the bundle of
//! repositories it reads and writes, so the same logic runs against
//! PostgreSQL in production and in-memory stores in tests.

pub mod activity;
pub mod blob;
pub mod engagement;
pub mod error;
pub mod feed;
pub mod graph;
pub mod hashtag;
pub mod page;
pub mod profile;
pub mod store;
pub mod view;

pub use activity::ActivityLog;
pub use blob::{BlobError, BlobStore, LocalBlobStore};
pub use engagement::Engagement;
pub use error::SocialError;
pub use feed::{FeedAssembler, NewPost};
pub use graph::SocialGraph;
pub use hashtag::extract_hashtags;
pub use page::PageRequest;
pub use profile::ProfileService;
pub use store::SocialStore;
pub use view::*;
