use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A registered account as stored in the `user:<id>` hash.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct User {
    pub id: String,
    pub username: String,
    #[serde(skip_serializing)]
    pub password: String,
    #[serde(skip_serializing)]
    pub auth: String,
}

impl User {
    pub fn to_fields(&self) -> [(&'static str, &str); 4] {
        [
            ("userId", self.id.as_str()),
            ("userName", self.username.as_str()),
            ("password", self.password.as_str()),
            ("auth", self.auth.as_str()),
        ]
    }

    /// `None` when the hash is missing its identity fields.
    pub fn from_fields(mut fields: HashMap<String, String>) -> Option<Self> {
        Some(User {
            id: fields.remove("userId")?,
            username: fields.remove("userName")?,
            password: fields.remove("password").unwrap_or_default(),
            auth: fields.remove("auth").unwrap_or_default(),
        })
    }
}

/// A published post.
///
/// `time` holds Unix seconds in storage and is replaced with a relative
/// label ("3 minutes") when a timeline page is read.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Post {
    pub id: String,
    pub user_id: String,
    pub time: String,
    pub body: String,
    pub user_name: String,
}

impl Post {
    pub fn to_fields(&self) -> [(&'static str, &str); 4] {
        [
            ("userId", self.user_id.as_str()),
            ("time", self.time.as_str()),
            ("body", self.body.as_str()),
            ("userName", self.user_name.as_str()),
        ]
    }

    pub fn from_fields(id: &str, mut fields: HashMap<String, String>) -> Option<Self> {
        Some(Post {
            id: id.to_string(),
            user_id: fields.remove("userId")?,
            time: fields.remove("time").unwrap_or_default(),
            body: fields.remove("body").unwrap_or_default(),
            user_name: fields.remove("userName").unwrap_or_default(),
        })
    }
}

/// One page of a timeline plus the cursor arithmetic around it.
#[derive(Serialize, Clone, Debug)]
pub struct Page {
    pub posts: Vec<Post>,
    pub start: i64,
    pub count: i64,
    pub remaining: i64,
}

impl Page {
    pub fn has_next(&self) -> bool {
        self.remaining > 0
    }

    pub fn has_prev(&self) -> bool {
        self.start > 0
    }

    pub fn next_start(&self) -> Option<i64> {
        self.has_next().then(|| self.start.saturating_add(self.count))
    }

    /// Not clamped: a page starting at 5 with count 10 reports -5.
    pub fn prev_start(&self) -> Option<i64> {
        self.has_prev().then(|| self.start - self.count)
    }
}

/// Public view of a user with follow-graph counters.
#[derive(Serialize, Clone, Debug)]
pub struct UserSummary {
    pub id: String,
    pub username: String,
    pub followers: i64,
    pub following: i64,
}
