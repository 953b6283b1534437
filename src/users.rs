use ammonia::Builder;

use crate::config::*;
use crate::core::errors::{FeedError, FeedResult, WriteContext};
use crate::core::helpers::{hash_password, new_auth_token, now_unix};
use crate::follow;
use crate::models::models::{User, UserSummary};
use crate::store::KvStore;

pub const USERNAME_TAKEN: &str = "Sorry the selected username is already in use.";

/// The display name as it is stored and looked up: tags stripped, text kept
/// literally (`tom&jerry` stays `tom&jerry`).
pub fn normalize_username(raw: &str) -> String {
    let stripped = Builder::default()
        .tags(std::collections::HashSet::new())
        .clean(raw.trim())
        .to_string();
    html_escape::decode_html_entities(&stripped).trim().to_string()
}

/// Creates an account and returns it with a fresh auth token.
///
/// The display name must be unique. The name index `users` enforces it with
/// a set-if-absent, so of two concurrent registrations only one claims it.
pub fn register(store: &dyn KvStore, username: &str, password: &str) -> FeedResult<User> {
    let username = normalize_username(username);
    if username.is_empty() || password.is_empty() {
        return Err(FeedError::invalid("Every field of the registration form is needed!"));
    }
    if username.contains(['<', '>']) {
        return Err(FeedError::invalid("Username may not contain markup"));
    }

    let taken = store
        .hget(USERS_KEY, &username)
        .write_failed("checking username")?;
    if taken.is_some() {
        return Err(FeedError::invalid(USERNAME_TAKEN));
    }

    let user_id = store.incr(NEXT_USER_ID_KEY).write_failed("allocating user id")?;
    let user = User {
        id: user_id.to_string(),
        username,
        password: hash_password(password).map_err(FeedError::WriteFailed)?,
        auth: new_auth_token(),
    };

    let claimed = store
        .hsetnx(USERS_KEY, &user.username, &user.id)
        .write_failed("indexing username")?;
    if !claimed {
        tracing::debug!(username = user.username.as_str(), "lost username race");
        return Err(FeedError::invalid(USERNAME_TAKEN));
    }

    store
        .hset_all(&user_key(&user.id), &user.to_fields())
        .write_failed("storing user")?;
    store
        .hset(AUTHS_KEY, &user.auth, &user.id)
        .write_failed("indexing auth token")?;
    store
        .zadd(USERS_BY_TIME_KEY, now_unix(), &user.username)
        .write_failed("recording registration")?;

    tracing::info!(user_id = user.id.as_str(), username = user.username.as_str(), "user registered");
    Ok(user)
}

pub fn load_user(store: &dyn KvStore, user_id: &str) -> FeedResult<User> {
    let fields = store
        .hget_all(&user_key(user_id))
        .map_err(|e| FeedError::not_found(format!("user {}: {:#}", user_id, e)))?;
    User::from_fields(fields).ok_or_else(|| FeedError::not_found(format!("user {}", user_id)))
}

pub fn user_by_name(store: &dyn KvStore, username: &str) -> FeedResult<User> {
    let user_id = store
        .hget(USERS_KEY, username)
        .map_err(|e| FeedError::not_found(format!("user {}: {:#}", username, e)))?
        .ok_or_else(|| FeedError::not_found(format!("user {}", username)))?;
    load_user(store, &user_id)
}

/// Display names of the most recently registered users, newest first.
pub fn latest_users(store: &dyn KvStore, limit: i64) -> FeedResult<Vec<String>> {
    if limit <= 0 {
        return Ok(Vec::new());
    }
    store
        .zrevrange(USERS_BY_TIME_KEY, 0, limit - 1)
        .map_err(|e| FeedError::not_found(format!("latest users: {:#}", e)))
}

pub fn summary(store: &dyn KvStore, user: &User) -> UserSummary {
    UserSummary {
        id: user.id.clone(),
        username: user.username.clone(),
        followers: follow::follower_count(store, &user.id),
        following: follow::following_count(store, &user.id),
    }
}
