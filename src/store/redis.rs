use std::collections::HashMap;

use anyhow::{anyhow, bail};
use spin_sdk::redis::{Connection, RedisParameter, RedisResult};

use super::KvStore;

/// [`KvStore`] over a Spin outbound Redis connection.
///
/// One connection is opened per request and closed when the store is dropped,
/// so it is released on every exit path of the handler that owns it.
pub struct RedisStore {
    conn: Connection,
}

impl RedisStore {
    pub fn open(address: &str) -> anyhow::Result<Self> {
        let conn = Connection::open(address)
            .map_err(|e| anyhow!("failed to open redis connection to {}: {:?}", address, e))?;
        Ok(Self { conn })
    }

    fn exec(&self, command: &str, args: Vec<RedisParameter>) -> anyhow::Result<Vec<RedisResult>> {
        self.conn
            .execute(command, &args)
            .map_err(|e| anyhow!("redis {} failed: {:?}", command, e))
    }
}

fn bin(value: &str) -> RedisParameter {
    RedisParameter::Binary(value.as_bytes().to_vec())
}

fn int(value: i64) -> RedisParameter {
    RedisParameter::Int64(value)
}

fn as_string(result: &RedisResult) -> anyhow::Result<Option<String>> {
    match result {
        RedisResult::Nil => Ok(None),
        RedisResult::Binary(bytes) => Ok(Some(String::from_utf8(bytes.clone())?)),
        RedisResult::Status(s) => Ok(Some(s.clone())),
        RedisResult::Int64(n) => Ok(Some(n.to_string())),
    }
}

fn as_int(results: &[RedisResult]) -> anyhow::Result<i64> {
    match results.first() {
        Some(RedisResult::Int64(n)) => Ok(*n),
        Some(other) => match as_string(other)? {
            Some(s) => Ok(s.parse()?),
            None => Ok(0),
        },
        None => bail!("empty redis reply"),
    }
}

fn as_strings(results: &[RedisResult]) -> anyhow::Result<Vec<String>> {
    results
        .iter()
        .filter_map(|r| as_string(r).transpose())
        .collect()
}

impl KvStore for RedisStore {
    fn hget(&self, key: &str, field: &str) -> anyhow::Result<Option<String>> {
        let reply = self.exec("HGET", vec![bin(key), bin(field)])?;
        match reply.first() {
            Some(r) => as_string(r),
            None => Ok(None),
        }
    }

    fn hset(&self, key: &str, field: &str, value: &str) -> anyhow::Result<()> {
        self.exec("HSET", vec![bin(key), bin(field), bin(value)])?;
        Ok(())
    }

    fn hsetnx(&self, key: &str, field: &str, value: &str) -> anyhow::Result<bool> {
        let reply = self.exec("HSETNX", vec![bin(key), bin(field), bin(value)])?;
        Ok(as_int(&reply)? == 1)
    }

    fn hset_all(&self, key: &str, fields: &[(&str, &str)]) -> anyhow::Result<()> {
        let mut args = vec![bin(key)];
        for (field, value) in fields {
            args.push(bin(field));
            args.push(bin(value));
        }
        self.exec("HSET", args)?;
        Ok(())
    }

    fn hget_all(&self, key: &str) -> anyhow::Result<HashMap<String, String>> {
        let flat = as_strings(&self.exec("HGETALL", vec![bin(key)])?)?;
        if flat.len() % 2 != 0 {
            bail!("HGETALL {} returned an odd number of elements", key);
        }
        Ok(flat
            .chunks(2)
            .map(|pair| (pair[0].clone(), pair[1].clone()))
            .collect())
    }

    fn hdel(&self, key: &str, field: &str) -> anyhow::Result<()> {
        self.exec("HDEL", vec![bin(key), bin(field)])?;
        Ok(())
    }

    fn incr(&self, key: &str) -> anyhow::Result<i64> {
        self.conn
            .incr(key)
            .map_err(|e| anyhow!("redis INCR {} failed: {:?}", key, e))
    }

    fn zadd(&self, key: &str, score: i64, member: &str) -> anyhow::Result<()> {
        self.exec("ZADD", vec![bin(key), int(score), bin(member)])?;
        Ok(())
    }

    fn zrem(&self, key: &str, member: &str) -> anyhow::Result<()> {
        self.exec("ZREM", vec![bin(key), bin(member)])?;
        Ok(())
    }

    fn zscore(&self, key: &str, member: &str) -> anyhow::Result<Option<i64>> {
        let reply = self.exec("ZSCORE", vec![bin(key), bin(member)])?;
        match reply.first().map(as_string).transpose()?.flatten() {
            // Scores come back as doubles ("1700000000" or "1.7e9").
            Some(s) => Ok(Some(s.parse::<f64>()? as i64)),
            None => Ok(None),
        }
    }

    fn zcard(&self, key: &str) -> anyhow::Result<i64> {
        as_int(&self.exec("ZCARD", vec![bin(key)])?)
    }

    fn zrange(&self, key: &str, start: i64, stop: i64) -> anyhow::Result<Vec<String>> {
        as_strings(&self.exec("ZRANGE", vec![bin(key), int(start), int(stop)])?)
    }

    fn zrevrange(&self, key: &str, start: i64, stop: i64) -> anyhow::Result<Vec<String>> {
        as_strings(&self.exec("ZREVRANGE", vec![bin(key), int(start), int(stop)])?)
    }

    fn lpush(&self, key: &str, value: &str) -> anyhow::Result<i64> {
        as_int(&self.exec("LPUSH", vec![bin(key), bin(value)])?)
    }

    fn ltrim(&self, key: &str, start: i64, stop: i64) -> anyhow::Result<()> {
        self.exec("LTRIM", vec![bin(key), int(start), int(stop)])?;
        Ok(())
    }

    fn lrange(&self, key: &str, start: i64, stop: i64) -> anyhow::Result<Vec<String>> {
        as_strings(&self.exec("LRANGE", vec![bin(key), int(start), int(stop)])?)
    }

    fn llen(&self, key: &str) -> anyhow::Result<i64> {
        as_int(&self.exec("LLEN", vec![bin(key)])?)
    }
}
