//! Key-value store adapter.
//!
//! The feed engine only needs a handful of Redis-shaped primitives: hashes,
//! an atomic counter, scored sets and lists. [`KvStore`] captures exactly
//! those so the engine can run against a live Redis connection inside a Spin
//! component or against [`MemoryStore`] in tests and the native server.

use std::collections::HashMap;

pub mod memory;
#[cfg(target_arch = "wasm32")]
pub mod redis;

pub use memory::MemoryStore;
#[cfg(target_arch = "wasm32")]
pub use self::redis::RedisStore;

/// Primitive operations over a shared key-value store.
///
/// Range arguments use Redis semantics: `stop` is inclusive, negative indices
/// count back from the tail, and a range that falls outside the collection
/// yields nothing rather than an error.
pub trait KvStore {
    fn hget(&self, key: &str, field: &str) -> anyhow::Result<Option<String>>;
    fn hset(&self, key: &str, field: &str, value: &str) -> anyhow::Result<()>;
    /// Sets `field` only if it is absent. Returns whether the write happened.
    fn hsetnx(&self, key: &str, field: &str, value: &str) -> anyhow::Result<bool>;
    fn hset_all(&self, key: &str, fields: &[(&str, &str)]) -> anyhow::Result<()>;
    /// Empty map when the hash does not exist.
    fn hget_all(&self, key: &str) -> anyhow::Result<HashMap<String, String>>;
    fn hdel(&self, key: &str, field: &str) -> anyhow::Result<()>;

    /// Atomically increments the counter at `key` and returns the new value.
    fn incr(&self, key: &str) -> anyhow::Result<i64>;

    fn zadd(&self, key: &str, score: i64, member: &str) -> anyhow::Result<()>;
    fn zrem(&self, key: &str, member: &str) -> anyhow::Result<()>;
    fn zscore(&self, key: &str, member: &str) -> anyhow::Result<Option<i64>>;
    fn zcard(&self, key: &str) -> anyhow::Result<i64>;
    /// Members ordered by ascending score.
    fn zrange(&self, key: &str, start: i64, stop: i64) -> anyhow::Result<Vec<String>>;
    /// Members ordered by descending score.
    fn zrevrange(&self, key: &str, start: i64, stop: i64) -> anyhow::Result<Vec<String>>;

    /// Prepends `value` and returns the new list length.
    fn lpush(&self, key: &str, value: &str) -> anyhow::Result<i64>;
    fn ltrim(&self, key: &str, start: i64, stop: i64) -> anyhow::Result<()>;
    fn lrange(&self, key: &str, start: i64, stop: i64) -> anyhow::Result<Vec<String>>;
    fn llen(&self, key: &str) -> anyhow::Result<i64>;
}

/// Resolves a Redis-style inclusive `[start, stop]` range against a
/// collection of `len` elements. `None` means the range is empty.
pub(crate) fn resolve_range(len: usize, start: i64, stop: i64) -> Option<(usize, usize)> {
    let len = len as i64;
    let mut start = if start < 0 { len + start } else { start };
    let mut stop = if stop < 0 { len + stop } else { stop };
    if start < 0 {
        start = 0;
    }
    if stop >= len {
        stop = len - 1;
    }
    if start >= len || start > stop {
        return None;
    }
    Some((start as usize, stop as usize))
}

#[cfg(test)]
mod tests {
    use super::resolve_range;

    #[test]
    fn whole_collection() {
        assert_eq!(resolve_range(5, 0, -1), Some((0, 4)));
    }

    #[test]
    fn stop_past_end_is_clamped() {
        assert_eq!(resolve_range(3, 1, 100), Some((1, 2)));
    }

    #[test]
    fn start_past_end_is_empty() {
        assert_eq!(resolve_range(3, 3, 10), None);
        assert_eq!(resolve_range(0, 0, -1), None);
    }

    #[test]
    fn negative_indices_count_from_tail() {
        assert_eq!(resolve_range(10, -3, -1), Some((7, 9)));
        assert_eq!(resolve_range(2, -10, 0), Some((0, 0)));
    }

    #[test]
    fn inverted_range_is_empty() {
        assert_eq!(resolve_range(10, 5, 2), None);
    }
}
