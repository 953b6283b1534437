#![allow(dead_code)]

use chirp::config::{user_key, USERS_KEY};
use chirp::store::{KvStore, MemoryStore};

/// Inserts a bare user record, skipping password hashing.
pub fn add_user(store: &MemoryStore, id: &str, name: &str) {
    store
        .hset_all(
            &user_key(id),
            &[("userId", id), ("userName", name), ("password", ""), ("auth", "")],
        )
        .unwrap();
    store.hset(USERS_KEY, name, id).unwrap();
}

pub fn timeline(store: &MemoryStore, key: &str) -> Vec<String> {
    store.lrange(key, 0, -1).unwrap()
}
