//! Write-time fan-out.
//!
//! Publishing pushes the new post id onto the personal timeline of the author
//! and every follower, then onto the global timeline, which is trimmed to
//! [`GLOBAL_TIMELINE_CAP`] entries. Reads never merge timelines.
//!
//! Fan-out is not atomic. The first failing step is reported as
//! [`FeedError::WriteFailed`] and everything written before it stays, so a
//! post can end up in some follower timelines but not others.

use anyhow::anyhow;

use crate::config::{personal_timeline_key, GLOBAL_TIMELINE_CAP, GLOBAL_TIMELINE_KEY};
use crate::core::errors::{FeedError, FeedResult, WriteContext};
use crate::follow;
use crate::posts;
use crate::store::KvStore;

/// Summary of one completed publish.
#[derive(Debug, Clone, PartialEq)]
pub struct Published {
    pub post_id: i64,
    /// Personal timelines that received the post, author included.
    pub delivered: usize,
}

/// The timelines a post from `author_id` must land in: every follower plus
/// the author, each listed once.
pub fn fan_out_targets(followers: Vec<String>, author_id: &str) -> Vec<String> {
    let mut targets: Vec<String> = Vec::with_capacity(followers.len() + 1);
    for id in followers {
        if id != author_id && !targets.contains(&id) {
            targets.push(id);
        }
    }
    targets.push(author_id.to_string());
    targets
}

pub fn publish(store: &dyn KvStore, author_id: &str, body: &str) -> FeedResult<Published> {
    let post_id = posts::next_post_id(store)?;

    posts::store_post(store, post_id, author_id, body).map_err(|e| match e {
        FeedError::WriteFailed(e) => FeedError::WriteFailed(e),
        other => FeedError::WriteFailed(anyhow!("creating post {}: {}", post_id, other)),
    })?;

    let followers = follow::followers_of(store, author_id).write_failed("loading followers")?;
    let targets = fan_out_targets(followers, author_id);
    let id = post_id.to_string();

    for (delivered, target) in targets.iter().enumerate() {
        if let Err(e) = store.lpush(&personal_timeline_key(target), &id) {
            tracing::warn!(
                post_id,
                target = target.as_str(),
                delivered,
                total = targets.len(),
                "fan-out interrupted"
            );
            return Err(FeedError::WriteFailed(
                e.context(format!("pushing post {} to timeline of {}", post_id, target)),
            ));
        }
    }

    push_global(store, &id)?;

    tracing::info!(post_id, author = author_id, delivered = targets.len(), "post published");
    Ok(Published {
        post_id,
        delivered: targets.len(),
    })
}

fn push_global(store: &dyn KvStore, post_id: &str) -> FeedResult<()> {
    store
        .lpush(GLOBAL_TIMELINE_KEY, post_id)
        .write_failed("pushing to global timeline")?;
    store
        .ltrim(GLOBAL_TIMELINE_KEY, 0, GLOBAL_TIMELINE_CAP - 1)
        .write_failed("trimming global timeline")?;
    Ok(())
}
