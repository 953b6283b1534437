use crate::config::{post_key, user_key, NEXT_POST_ID_KEY};
use crate::core::errors::{FeedError, FeedResult, WriteContext};
use crate::core::helpers::now_unix;
use crate::models::models::Post;
use crate::store::KvStore;

/// Allocates the next post id from the store's atomic counter.
///
/// Ids are never reused. A failed publish leaves a gap, which is fine.
pub fn next_post_id(store: &dyn KvStore) -> FeedResult<i64> {
    store.incr(NEXT_POST_ID_KEY).write_failed("allocating post id")
}

pub fn normalize_body(body: &str) -> String {
    body.replace('\n', " ")
}

fn author_name(store: &dyn KvStore, author_id: &str) -> anyhow::Result<Option<String>> {
    store.hget(&user_key(author_id), "userName")
}

/// Allocates an id and stores a new post under it.
pub fn create(store: &dyn KvStore, author_id: &str, body: &str) -> FeedResult<Post> {
    let post_id = next_post_id(store)?;
    store_post(store, post_id, author_id, body)
}

/// Stores the post record under an already allocated `post_id`.
pub fn store_post(store: &dyn KvStore, post_id: i64, author_id: &str, body: &str) -> FeedResult<Post> {
    let user_name = author_name(store, author_id)
        .write_failed("resolving author")?
        .ok_or_else(|| FeedError::not_found(format!("user {}", author_id)))?;

    let post = Post {
        id: post_id.to_string(),
        user_id: author_id.to_string(),
        time: now_unix().to_string(),
        body: normalize_body(body),
        user_name,
    };

    store
        .hset_all(&post_key(&post.id), &post.to_fields())
        .write_failed("storing post")?;

    Ok(post)
}

/// Loads a post with its author name resolved from the live user record.
///
/// The name copied onto the post at publish time is never returned, so a
/// post reads the same through every path.
pub fn get(store: &dyn KvStore, post_id: &str) -> FeedResult<Post> {
    let fields = store
        .hget_all(&post_key(post_id))
        .map_err(|e| FeedError::not_found(format!("post {}: {:#}", post_id, e)))?;
    let mut post = Post::from_fields(post_id, fields)
        .ok_or_else(|| FeedError::not_found(format!("post {}", post_id)))?;

    post.user_name = author_name(store, &post.user_id)
        .map_err(|e| FeedError::not_found(format!("author of post {}: {:#}", post_id, e)))?
        .ok_or_else(|| FeedError::not_found(format!("author of post {}", post_id)))?;

    Ok(post)
}
