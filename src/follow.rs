//! Follow graph.
//!
//! Every edge A→B lives twice: as B in `following:A` and as A in
//! `followers:B`, both scored with the follow time.

use crate::config::{followers_key, following_key};
use crate::core::errors::{FeedError, FeedResult, WriteContext};
use crate::core::helpers::now_unix;
use crate::store::KvStore;

pub fn follow(store: &dyn KvStore, follower_id: &str, followee_id: &str) -> FeedResult<()> {
    if follower_id == followee_id {
        return Err(FeedError::invalid("you can't follow yourself"));
    }

    let now = now_unix();
    // No rollback: if the second insert fails the first one stays.
    store
        .zadd(&following_key(follower_id), now, followee_id)
        .write_failed("adding following edge")?;
    store
        .zadd(&followers_key(followee_id), now, follower_id)
        .write_failed("adding follower edge")?;

    tracing::info!(follower = follower_id, followee = followee_id, "follow");
    Ok(())
}

/// Removing an edge that does not exist is not an error.
pub fn unfollow(store: &dyn KvStore, follower_id: &str, followee_id: &str) -> FeedResult<()> {
    store
        .zrem(&following_key(follower_id), followee_id)
        .write_failed("removing following edge")?;
    store
        .zrem(&followers_key(followee_id), follower_id)
        .write_failed("removing follower edge")?;

    tracing::info!(follower = follower_id, followee = followee_id, "unfollow");
    Ok(())
}

/// Lookup failures read as "not following".
pub fn is_following(store: &dyn KvStore, user_id: &str, other_id: &str) -> bool {
    matches!(store.zscore(&following_key(user_id), other_id), Ok(Some(score)) if score > 0)
}

/// An unknown user has no followers, so lookup failures count as zero.
pub fn follower_count(store: &dyn KvStore, user_id: &str) -> i64 {
    store.zcard(&followers_key(user_id)).unwrap_or(0)
}

pub fn following_count(store: &dyn KvStore, user_id: &str) -> i64 {
    store.zcard(&following_key(user_id)).unwrap_or(0)
}

/// All followers of `user_id`, most recent follow first.
pub fn followers_of(store: &dyn KvStore, user_id: &str) -> anyhow::Result<Vec<String>> {
    store.zrevrange(&followers_key(user_id), 0, -1)
}
