//! Reverse-chronological social feed with write-time fan-out.
//!
//! Publishing a post pushes its id onto the author's and every follower's
//! personal timeline and onto one capped global timeline; reading a timeline
//! is a single indexed range scan followed by per-post lookups.

pub mod auth;
pub mod config;
pub mod core;
pub mod fanout;
pub mod follow;
pub mod handlers;
pub mod models;
pub mod posts;
pub mod store;
pub mod timeline;
pub mod users;

#[cfg(target_arch = "wasm32")]
mod component;

pub use crate::core::errors::{FeedError, FeedResult};
pub use crate::fanout::{publish, Published};
pub use crate::models::models::{Page, Post, User, UserSummary};
pub use crate::store::{KvStore, MemoryStore};
pub use crate::timeline::{page, TimelineKey};
