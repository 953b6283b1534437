use crate::config::{user_key, AUTHS_KEY};
use crate::core::errors::{FeedError, FeedResult, WriteContext};
use crate::core::helpers::{new_auth_token, verify_password};
use crate::models::models::User;
use crate::store::KvStore;
use crate::users::{load_user, user_by_name};

/// Checks credentials and returns the user's current auth token.
///
/// Unknown names and wrong passwords are reported identically.
pub fn login(store: &dyn KvStore, username: &str, password: &str) -> FeedResult<User> {
    let wrong = || FeedError::not_found("Wrong username or password");
    if username.is_empty() || password.is_empty() {
        return Err(wrong());
    }

    let user = user_by_name(store, username).map_err(|_| wrong())?;
    if !verify_password(password, &user.password) {
        return Err(wrong());
    }

    tracing::info!(user_id = user.id.as_str(), "login");
    Ok(user)
}

/// Rotates the user's auth token, invalidating the old one.
///
/// The new token is indexed before the old one is dropped, so a failure
/// part-way never leaves the user without a valid token.
pub fn logout(store: &dyn KvStore, user_id: &str) -> FeedResult<String> {
    let old_auth = store
        .hget(&user_key(user_id), "auth")
        .write_failed("reading auth token")?
        .ok_or_else(|| FeedError::not_found(format!("user {}", user_id)))?;
    let new_auth = new_auth_token();

    store
        .hset(&user_key(user_id), "auth", &new_auth)
        .write_failed("rotating auth token")?;
    store
        .hset(AUTHS_KEY, &new_auth, user_id)
        .write_failed("indexing auth token")?;
    store
        .hdel(AUTHS_KEY, &old_auth)
        .write_failed("dropping old auth token")?;

    tracing::info!(user_id, "logout");
    Ok(new_auth)
}

/// Resolves an opaque auth token to its user.
pub fn user_from_auth(store: &dyn KvStore, auth: &str) -> FeedResult<User> {
    if auth.is_empty() {
        return Err(FeedError::not_found("No Authentication"));
    }

    let user_id = store
        .hget(AUTHS_KEY, auth)
        .map_err(|e| FeedError::not_found(format!("auth lookup: {:#}", e)))?
        .ok_or_else(|| FeedError::not_found("unknown auth token"))?;

    let user = load_user(store, &user_id)?;
    if user.auth != auth {
        return Err(FeedError::not_found("stale auth token"));
    }
    Ok(user)
}
