use spin_sdk::http::{Request, Response};
use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use argon2::password_hash::SaltString;
use rand::rngs::OsRng;
use serde::Serialize;
use uuid::Uuid;

pub fn now_unix() -> i64 {
    chrono::Utc::now().timestamp()
}

pub fn hash_password(password: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    use argon2::PasswordHash;

    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

/// Opaque authentication token. Callers never interpret its format.
pub fn new_auth_token() -> String {
    Uuid::new_v4().simple().to_string()
}

pub fn bearer_token(req: &Request) -> Option<String> {
    let auth_header = req.header("Authorization")?.as_str()?;
    auth_header
        .strip_prefix("Bearer ")
        .filter(|t| !t.is_empty())
        .map(|t| t.to_string())
}

pub fn json_response<T: Serialize>(status: u16, value: &T) -> anyhow::Result<Response> {
    Ok(Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .body(serde_json::to_vec(value)?)
        .build())
}

/// Human-relative age of a post given its stored Unix timestamp.
///
/// Unparseable timestamps yield an empty label.
pub fn elapsed_label(posted: &str, now: i64) -> String {
    let ts = match posted.trim().parse::<i64>() {
        Ok(ts) => ts,
        Err(_) => return String::new(),
    };
    let t = now - ts;
    if t < 60 {
        return format!("{} seconds", t);
    }
    if t < 3600 {
        return plural(t / 60, "minute");
    }
    if t < 86400 {
        return plural(t / 3600, "hour");
    }
    plural(t / 86400, "day")
}

fn plural(n: i64, unit: &str) -> String {
    if n > 1 {
        format!("{} {}s", n, unit)
    } else {
        format!("{} {}", n, unit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: i64 = 1_700_000_000;

    fn ago(secs: i64) -> String {
        elapsed_label(&(NOW - secs).to_string(), NOW)
    }

    #[test]
    fn seconds_are_never_singularised() {
        assert_eq!(ago(30), "30 seconds");
        assert_eq!(ago(1), "1 seconds");
        assert_eq!(ago(0), "0 seconds");
    }

    #[test]
    fn minutes_hours_days() {
        assert_eq!(ago(61), "1 minute");
        assert_eq!(ago(125), "2 minutes");
        assert_eq!(ago(3601), "1 hour");
        assert_eq!(ago(7300), "2 hours");
        assert_eq!(ago(90000), "1 day");
        assert_eq!(ago(86400 * 3 + 5), "3 days");
    }

    #[test]
    fn unit_boundaries() {
        assert_eq!(ago(59), "59 seconds");
        assert_eq!(ago(60), "1 minute");
        assert_eq!(ago(3599), "59 minutes");
        assert_eq!(ago(86399), "23 hours");
        assert_eq!(ago(86400), "1 day");
    }

    #[test]
    fn garbage_timestamp_is_blank() {
        assert_eq!(elapsed_label("yesterday", NOW), "");
        assert_eq!(elapsed_label("", NOW), "");
    }

    #[test]
    fn password_hash_verifies() {
        let hash = hash_password("hunter2").unwrap();
        assert!(verify_password("hunter2", &hash));
        assert!(!verify_password("hunter3", &hash));
        assert!(!verify_password("hunter2", "not-a-phc-string"));
    }

    #[test]
    fn tokens_are_unique() {
        assert_ne!(new_auth_token(), new_auth_token());
    }
}
