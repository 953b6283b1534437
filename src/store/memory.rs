use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Mutex, MutexGuard};

use anyhow::bail;

use super::{resolve_range, KvStore};

#[derive(Default)]
struct State {
    hashes: HashMap<String, HashMap<String, String>>,
    counters: HashMap<String, i64>,
    sorted_sets: HashMap<String, HashMap<String, i64>>,
    lists: HashMap<String, VecDeque<String>>,
}

#[derive(Default)]
struct Faults {
    all_writes: bool,
    keys: HashSet<String>,
}

/// In-process store with the same semantics as the Redis adapter.
///
/// Every operation takes the single state lock, so each primitive is atomic
/// with respect to the others, just like a single Redis server.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
    faults: Mutex<Faults>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent write fail until [`MemoryStore::heal`] is called.
    pub fn fail_all_writes(&self) {
        self.faults().all_writes = true;
    }

    /// Makes subsequent writes to `key` fail.
    pub fn fail_writes_to(&self, key: impl Into<String>) {
        self.faults().keys.insert(key.into());
    }

    pub fn heal(&self) {
        let mut faults = self.faults();
        faults.all_writes = false;
        faults.keys.clear();
    }

    fn faults(&self) -> MutexGuard<'_, Faults> {
        self.faults.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn check_write(&self, key: &str) -> anyhow::Result<()> {
        let faults = self.faults();
        if faults.all_writes || faults.keys.contains(key) {
            bail!("injected write failure on {}", key);
        }
        Ok(())
    }
}

fn ordered_members(set: &HashMap<String, i64>) -> Vec<String> {
    let mut members: Vec<(&String, &i64)> = set.iter().collect();
    members.sort_by(|a, b| a.1.cmp(b.1).then_with(|| a.0.cmp(b.0)));
    members.into_iter().map(|(m, _)| m.clone()).collect()
}

fn slice<T: Clone>(items: &[T], start: i64, stop: i64) -> Vec<T> {
    match resolve_range(items.len(), start, stop) {
        Some((from, to)) => items[from..=to].to_vec(),
        None => Vec::new(),
    }
}

impl KvStore for MemoryStore {
    fn hget(&self, key: &str, field: &str) -> anyhow::Result<Option<String>> {
        Ok(self
            .state()
            .hashes
            .get(key)
            .and_then(|h| h.get(field))
            .cloned())
    }

    fn hset(&self, key: &str, field: &str, value: &str) -> anyhow::Result<()> {
        self.check_write(key)?;
        self.state()
            .hashes
            .entry(key.to_string())
            .or_default()
            .insert(field.to_string(), value.to_string());
        Ok(())
    }

    fn hsetnx(&self, key: &str, field: &str, value: &str) -> anyhow::Result<bool> {
        self.check_write(key)?;
        let mut state = self.state();
        let hash = state.hashes.entry(key.to_string()).or_default();
        if hash.contains_key(field) {
            return Ok(false);
        }
        hash.insert(field.to_string(), value.to_string());
        Ok(true)
    }

    fn hset_all(&self, key: &str, fields: &[(&str, &str)]) -> anyhow::Result<()> {
        self.check_write(key)?;
        let mut state = self.state();
        let hash = state.hashes.entry(key.to_string()).or_default();
        for (field, value) in fields {
            hash.insert(field.to_string(), value.to_string());
        }
        Ok(())
    }

    fn hget_all(&self, key: &str) -> anyhow::Result<HashMap<String, String>> {
        Ok(self.state().hashes.get(key).cloned().unwrap_or_default())
    }

    fn hdel(&self, key: &str, field: &str) -> anyhow::Result<()> {
        self.check_write(key)?;
        let mut state = self.state();
        if let Some(hash) = state.hashes.get_mut(key) {
            hash.remove(field);
            if hash.is_empty() {
                state.hashes.remove(key);
            }
        }
        Ok(())
    }

    fn incr(&self, key: &str) -> anyhow::Result<i64> {
        self.check_write(key)?;
        let mut state = self.state();
        let counter = state.counters.entry(key.to_string()).or_insert(0);
        *counter += 1;
        Ok(*counter)
    }

    fn zadd(&self, key: &str, score: i64, member: &str) -> anyhow::Result<()> {
        self.check_write(key)?;
        self.state()
            .sorted_sets
            .entry(key.to_string())
            .or_default()
            .insert(member.to_string(), score);
        Ok(())
    }

    fn zrem(&self, key: &str, member: &str) -> anyhow::Result<()> {
        self.check_write(key)?;
        let mut state = self.state();
        if let Some(set) = state.sorted_sets.get_mut(key) {
            set.remove(member);
            if set.is_empty() {
                state.sorted_sets.remove(key);
            }
        }
        Ok(())
    }

    fn zscore(&self, key: &str, member: &str) -> anyhow::Result<Option<i64>> {
        Ok(self
            .state()
            .sorted_sets
            .get(key)
            .and_then(|s| s.get(member))
            .copied())
    }

    fn zcard(&self, key: &str) -> anyhow::Result<i64> {
        Ok(self
            .state()
            .sorted_sets
            .get(key)
            .map(|s| s.len() as i64)
            .unwrap_or(0))
    }

    fn zrange(&self, key: &str, start: i64, stop: i64) -> anyhow::Result<Vec<String>> {
        let state = self.state();
        let members = state.sorted_sets.get(key).map(ordered_members).unwrap_or_default();
        Ok(slice(&members, start, stop))
    }

    fn zrevrange(&self, key: &str, start: i64, stop: i64) -> anyhow::Result<Vec<String>> {
        let state = self.state();
        let mut members = state.sorted_sets.get(key).map(ordered_members).unwrap_or_default();
        members.reverse();
        Ok(slice(&members, start, stop))
    }

    fn lpush(&self, key: &str, value: &str) -> anyhow::Result<i64> {
        self.check_write(key)?;
        let mut state = self.state();
        let list = state.lists.entry(key.to_string()).or_default();
        list.push_front(value.to_string());
        Ok(list.len() as i64)
    }

    fn ltrim(&self, key: &str, start: i64, stop: i64) -> anyhow::Result<()> {
        self.check_write(key)?;
        let mut state = self.state();
        let Some(list) = state.lists.get_mut(key) else {
            return Ok(());
        };
        match resolve_range(list.len(), start, stop) {
            Some((from, to)) => {
                list.truncate(to + 1);
                list.drain(..from);
            }
            None => {
                state.lists.remove(key);
            }
        }
        Ok(())
    }

    fn lrange(&self, key: &str, start: i64, stop: i64) -> anyhow::Result<Vec<String>> {
        let state = self.state();
        let items: Vec<String> = state
            .lists
            .get(key)
            .map(|l| l.iter().cloned().collect())
            .unwrap_or_default();
        Ok(slice(&items, start, stop))
    }

    fn llen(&self, key: &str) -> anyhow::Result<i64> {
        Ok(self.state().lists.get(key).map(|l| l.len() as i64).unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lpush_prepends_and_ltrim_keeps_head() {
        let store = MemoryStore::new();
        for i in 1..=5 {
            store.lpush("l", &i.to_string()).unwrap();
        }
        assert_eq!(store.lrange("l", 0, -1).unwrap(), vec!["5", "4", "3", "2", "1"]);

        store.ltrim("l", 0, 2).unwrap();
        assert_eq!(store.lrange("l", 0, -1).unwrap(), vec!["5", "4", "3"]);
        assert_eq!(store.llen("l").unwrap(), 3);
    }

    #[test]
    fn ltrim_with_empty_range_removes_list() {
        let store = MemoryStore::new();
        store.lpush("l", "a").unwrap();
        store.ltrim("l", 5, 10).unwrap();
        assert_eq!(store.llen("l").unwrap(), 0);
    }

    #[test]
    fn sorted_set_orders_by_score_then_member() {
        let store = MemoryStore::new();
        store.zadd("z", 20, "b").unwrap();
        store.zadd("z", 10, "c").unwrap();
        store.zadd("z", 20, "a").unwrap();

        assert_eq!(store.zrange("z", 0, -1).unwrap(), vec!["c", "a", "b"]);
        assert_eq!(store.zrevrange("z", 0, -1).unwrap(), vec!["b", "a", "c"]);
        assert_eq!(store.zrevrange("z", 0, 0).unwrap(), vec!["b"]);
        assert_eq!(store.zcard("z").unwrap(), 3);
        assert_eq!(store.zscore("z", "c").unwrap(), Some(10));

        store.zrem("z", "c").unwrap();
        assert_eq!(store.zscore("z", "c").unwrap(), None);
        assert_eq!(store.zcard("z").unwrap(), 2);
    }

    #[test]
    fn incr_starts_at_one() {
        let store = MemoryStore::new();
        assert_eq!(store.incr("c").unwrap(), 1);
        assert_eq!(store.incr("c").unwrap(), 2);
    }

    #[test]
    fn hashes_hold_independent_fields() {
        let store = MemoryStore::new();
        store.hset_all("h", &[("a", "1"), ("b", "2")]).unwrap();
        store.hset("h", "a", "3").unwrap();
        assert_eq!(store.hget("h", "a").unwrap().as_deref(), Some("3"));
        assert_eq!(store.hget_all("h").unwrap().len(), 2);

        store.hdel("h", "a").unwrap();
        assert_eq!(store.hget("h", "a").unwrap(), None);
        assert!(store.hget_all("missing").unwrap().is_empty());
    }

    #[test]
    fn hsetnx_keeps_first_writer() {
        let store = MemoryStore::new();
        assert!(store.hsetnx("users", "carol", "1").unwrap());
        assert!(!store.hsetnx("users", "carol", "2").unwrap());
        assert_eq!(store.hget("users", "carol").unwrap().as_deref(), Some("1"));
    }

    #[test]
    fn injected_faults_only_block_writes() {
        let store = MemoryStore::new();
        store.lpush("l", "a").unwrap();
        store.fail_writes_to("l");

        assert!(store.lpush("l", "b").is_err());
        assert!(store.lpush("other", "b").is_ok());
        assert_eq!(store.lrange("l", 0, -1).unwrap(), vec!["a"]);

        store.fail_all_writes();
        assert!(store.incr("c").is_err());

        store.heal();
        assert!(store.lpush("l", "b").is_ok());
    }
}
