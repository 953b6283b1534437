use spin_sdk::http::{Method, Request, Response};
use serde_json::json;

use crate::auth::{login, logout, user_from_auth};
use crate::config::*;
use crate::core::errors::{ApiError, FeedError};
use crate::core::helpers::{bearer_token, json_response};
use crate::core::query_params::{get_offset, get_string, parse_query_params};
use crate::fanout::publish;
use crate::follow::{follow, is_following, unfollow};
use crate::models::models::{Page, User};
use crate::store::KvStore;
use crate::timeline::{page, TimelineKey};
use crate::users::{
    latest_users, load_user, normalize_username, register, summary, user_by_name, USERNAME_TAKEN,
};

type HandlerResult = Result<Response, ApiError>;

/// Routes one request against `store`. Errors are rendered as JSON bodies.
pub fn handle_request(store: &dyn KvStore, req: Request) -> anyhow::Result<Response> {
    let path = req.path().to_string();

    let result = match (req.method(), path.as_str()) {
        (Method::Post, "/users") => create_user(store, &req),
        (Method::Post, "/login") => login_user(store, &req),
        (Method::Post, "/logout") => logout_user(store, &req),
        (Method::Post, "/posts") => create_post(store, &req),
        (Method::Get, "/home") => home(store, &req),
        (Method::Get, "/profile") => profile(store, &req),
        (Method::Get, "/timeline") => global_timeline(store),
        (Method::Post, "/follow") => handle_follow(store, &req),
        (Method::Post, "/unfollow") => handle_unfollow(store, &req),
        (Method::Get, p) if p.starts_with("/users/") && p.len() > 7 => {
            user_details(store, p.trim_start_matches("/users/"))
        }
        _ => Err(ApiError::NotFound("No route found".to_string())),
    };

    match result {
        Ok(resp) => Ok(resp),
        Err(err) => {
            tracing::debug!(path = path.as_str(), status = err.status(), error = %err, "request failed");
            Ok(err.into())
        }
    }
}

fn body_json(req: &Request) -> Result<serde_json::Value, ApiError> {
    serde_json::from_slice(req.body())
        .map_err(|_| ApiError::BadRequest("Request body is not well-formed. It must be JSON.".to_string()))
}

fn current_user(store: &dyn KvStore, req: &Request) -> Result<User, ApiError> {
    let token = bearer_token(req).ok_or(ApiError::Unauthorized)?;
    user_from_auth(store, &token).map_err(|_| ApiError::Unauthorized)
}

fn page_json(feed: &Page) -> serde_json::Value {
    json!({
        "posts": feed.posts,
        "prev": feed.prev_start().map(|p| p.max(0)),
        "next": feed.next_start(),
    })
}

fn create_user(store: &dyn KvStore, req: &Request) -> HandlerResult {
    let value = body_json(req)?;
    let username = normalize_username(value["username"].as_str().unwrap_or_default());
    let password = value["password"].as_str().unwrap_or_default();

    if username.is_empty() || password.is_empty() {
        return Err(ApiError::BadRequest("Every field of the registration form is needed!".to_string()));
    }
    if username.len() < MIN_USERNAME_LENGTH || username.len() > MAX_USERNAME_LENGTH {
        return Err(ApiError::BadRequest("Username must be 3-50 characters".to_string()));
    }
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(ApiError::BadRequest("Password must be at least 3 characters".to_string()));
    }

    let user = register(store, &username, password).map_err(|e| match e {
        FeedError::InvalidOperation(msg) if msg == USERNAME_TAKEN => ApiError::Conflict(msg),
        other => other.into(),
    })?;

    Ok(json_response(
        201,
        &json!({ "id": user.id, "username": user.username, "token": user.auth }),
    )?)
}

fn login_user(store: &dyn KvStore, req: &Request) -> HandlerResult {
    let value = body_json(req)?;
    let username = value["username"].as_str().unwrap_or_default();
    let password = value["password"].as_str().unwrap_or_default();

    let user = login(store, username, password).map_err(|_| ApiError::Unauthorized)?;
    Ok(json_response(200, &json!({ "token": user.auth, "user_id": user.id }))?)
}

fn logout_user(store: &dyn KvStore, req: &Request) -> HandlerResult {
    let user = current_user(store, req)?;
    logout(store, &user.id)?;
    Ok(json_response(200, &json!({ "message": "Logged out successfully" }))?)
}

fn create_post(store: &dyn KvStore, req: &Request) -> HandlerResult {
    let user = current_user(store, req)?;
    let value = body_json(req)?;
    let body = value["body"].as_str().unwrap_or_default();

    if body.trim().is_empty() || body.len() > MAX_POST_LENGTH {
        return Err(ApiError::BadRequest("Invalid content".to_string()));
    }

    let published = publish(store, &user.id, body)?;
    Ok(json_response(
        201,
        &json!({ "id": published.post_id.to_string(), "delivered": published.delivered }),
    )?)
}

fn home(store: &dyn KvStore, req: &Request) -> HandlerResult {
    let user = current_user(store, req)?;
    let params = parse_query_params(req.uri());
    let start = get_offset(&params, "start");

    let feed = page(store, &TimelineKey::personal(user.id.as_str()), start, POSTS_PER_PAGE)?;
    let mut body = page_json(&feed);
    body["user"] = serde_json::to_value(summary(store, &user)).map_err(anyhow::Error::from)?;
    Ok(json_response(200, &body)?)
}

fn profile(store: &dyn KvStore, req: &Request) -> HandlerResult {
    let params = parse_query_params(req.uri());
    let username = get_string(&params, "u")
        .ok_or_else(|| ApiError::BadRequest("User name required".to_string()))?;
    let start = get_offset(&params, "start");

    let other = user_by_name(store, &username)?;
    let viewer = current_user(store, req).ok();

    let feed = page(store, &TimelineKey::personal(other.id.as_str()), start, POSTS_PER_PAGE)?;
    let mut body = page_json(&feed);
    body["profile"] = serde_json::to_value(summary(store, &other)).map_err(anyhow::Error::from)?;
    if let Some(viewer) = viewer {
        body["is_self"] = json!(viewer.id == other.id);
        body["is_following"] = json!(is_following(store, &viewer.id, &other.id));
    }
    Ok(json_response(200, &body)?)
}

fn global_timeline(store: &dyn KvStore) -> HandlerResult {
    let users = latest_users(store, LATEST_USERS_COUNT)?;
    let feed = page(store, &TimelineKey::Global, 0, GLOBAL_TIMELINE_PAGE)?;
    Ok(json_response(200, &json!({ "users": users, "posts": feed.posts }))?)
}

fn target_user(value: &serde_json::Value) -> Result<String, ApiError> {
    let target = value["target_user_id"].as_str().unwrap_or_default();
    if target.is_empty() {
        return Err(ApiError::BadRequest("invalid user id".to_string()));
    }
    Ok(target.to_string())
}

fn handle_follow(store: &dyn KvStore, req: &Request) -> HandlerResult {
    let user = current_user(store, req)?;
    let target_id = target_user(&body_json(req)?)?;
    let target = load_user(store, &target_id)?;

    follow(store, &user.id, &target.id)?;
    Ok(json_response(200, &json!({ "status": "followed", "profile": target.username }))?)
}

fn handle_unfollow(store: &dyn KvStore, req: &Request) -> HandlerResult {
    let user = current_user(store, req)?;
    let target_id = target_user(&body_json(req)?)?;
    if target_id == user.id {
        return Err(ApiError::BadRequest("you can't follow yourself".to_string()));
    }
    let target = load_user(store, &target_id)?;

    unfollow(store, &user.id, &target.id)?;
    Ok(json_response(200, &json!({ "status": "unfollowed", "profile": target.username }))?)
}

fn user_details(store: &dyn KvStore, user_id: &str) -> HandlerResult {
    let user = load_user(store, user_id)?;
    Ok(json_response(200, &summary(store, &user))?)
}
