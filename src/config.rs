// === Limits ===
pub const GLOBAL_TIMELINE_CAP: i64 = 2001;
pub const POSTS_PER_PAGE: i64 = 10;
pub const GLOBAL_TIMELINE_PAGE: i64 = 50;
pub const LATEST_USERS_COUNT: i64 = 10;
pub const MAX_POST_LENGTH: usize = 5000;
pub const MIN_USERNAME_LENGTH: usize = 3;
pub const MAX_USERNAME_LENGTH: usize = 50;
pub const MIN_PASSWORD_LENGTH: usize = 3;

// === Store keys ===
pub const NEXT_POST_ID_KEY: &str = "next_post_id";
pub const NEXT_USER_ID_KEY: &str = "next_user_id";
pub const USERS_KEY: &str = "users";
pub const AUTHS_KEY: &str = "auths";
pub const USERS_BY_TIME_KEY: &str = "users_by_time";
pub const GLOBAL_TIMELINE_KEY: &str = "timeline";

pub fn user_key(user_id: &str) -> String {
    format!("user:{}", user_id)
}

pub fn post_key(post_id: &str) -> String {
    format!("post:{}", post_id)
}

pub fn personal_timeline_key(user_id: &str) -> String {
    format!("posts:{}", user_id)
}

pub fn followers_key(user_id: &str) -> String {
    format!("followers:{}", user_id)
}

pub fn following_key(user_id: &str) -> String {
    format!("following:{}", user_id)
}

// === Environment ===
pub fn redis_address() -> String {
    std::env::var("CHIRP_REDIS_ADDRESS").unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string())
}

pub fn bind_address() -> String {
    std::env::var("CHIRP_BIND").unwrap_or_else(|_| "0.0.0.0:8000".to_string())
}

pub fn seed_demo_data() -> bool {
    std::env::var("CHIRP_SEED")
        .map(|v| matches!(v.as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}
