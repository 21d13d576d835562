//! A production [`RankStore`] backed by Redis.
//!
//! Sorted sets and plain sets map one-to-one onto Redis ZSETs and SETs. Write batches are
//! `MULTI`/`EXEC` transaction pipelines, which gives [`RankStore::write`] its required
//! atomicity; [`counts_in_score_range`](crate::store::pluggables::RankRead::counts_in_score_range)
//! is a non-transactional pipeline of ZCOUNTs, one round-trip for the whole batch.

use redis::{Client, Connection, Pipeline};

use super::pluggables::{RankRead, RankStore, StoreError, WriteBatch};

/// A cloneable handle to a Redis backend. Each operation checks a fresh connection out of the
/// client.
#[derive(Clone)]
pub struct RedisRankStore {
    client: Client,
}

impl RedisRankStore {
    /// Create a store handle from a Redis URL (e.g. `redis://127.0.0.1:6379/0`).
    pub fn open(url: &str) -> Result<RedisRankStore, StoreError> {
        let client = Client::open(url).map_err(unavailable)?;
        Ok(RedisRankStore { client })
    }

    fn connection(&self) -> Result<Connection, StoreError> {
        self.client.get_connection().map_err(unavailable)
    }
}

impl RankRead for RedisRankStore {
    fn member_score(&self, key: &[u8], member: &[u8]) -> Result<Option<f64>, StoreError> {
        let mut conn = self.connection()?;
        redis::cmd("ZSCORE")
            .arg(key)
            .arg(member)
            .query(&mut conn)
            .map_err(unavailable)
    }

    fn page_desc(&self, key: &[u8], offset: u64, limit: u64) -> Result<Vec<Vec<u8>>, StoreError> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        let (start, stop) = revrange_bounds(offset, limit);
        let mut conn = self.connection()?;
        redis::cmd("ZREVRANGE")
            .arg(key)
            .arg(start)
            .arg(stop)
            .query(&mut conn)
            .map_err(unavailable)
    }

    fn page_desc_with_scores(
        &self,
        key: &[u8],
        offset: u64,
        limit: u64,
    ) -> Result<Vec<(Vec<u8>, f64)>, StoreError> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        let (start, stop) = revrange_bounds(offset, limit);
        let mut conn = self.connection()?;
        redis::cmd("ZREVRANGE")
            .arg(key)
            .arg(start)
            .arg(stop)
            .arg("WITHSCORES")
            .query(&mut conn)
            .map_err(unavailable)
    }

    fn count_in_score_range(&self, key: &[u8], min: f64, max: f64) -> Result<u64, StoreError> {
        let mut conn = self.connection()?;
        redis::cmd("ZCOUNT")
            .arg(key)
            .arg(min)
            .arg(max)
            .query(&mut conn)
            .map_err(unavailable)
    }

    fn counts_in_score_range(
        &self,
        keys: &[Vec<u8>],
        min: f64,
        max: f64,
    ) -> Result<Vec<u64>, StoreError> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }
        let mut pipe = redis::pipe();
        for key in keys {
            pipe.cmd("ZCOUNT").arg(key).arg(min).arg(max);
        }
        let mut conn = self.connection()?;
        pipe.query(&mut conn).map_err(unavailable)
    }

    fn set_members(&self, key: &[u8]) -> Result<Vec<Vec<u8>>, StoreError> {
        let mut conn = self.connection()?;
        redis::cmd("SMEMBERS")
            .arg(key)
            .query(&mut conn)
            .map_err(unavailable)
    }
}

impl RankStore for RedisRankStore {
    type WriteBatch = RedisWriteBatch;

    fn write(&mut self, wb: Self::WriteBatch) -> Result<(), StoreError> {
        let mut conn = self.connection()?;
        wb.pipe.query::<()>(&mut conn).map_err(unavailable)
    }
}

/// A `MULTI`/`EXEC` pipeline in the making.
pub struct RedisWriteBatch {
    pipe: Pipeline,
}

impl WriteBatch for RedisWriteBatch {
    fn new() -> Self {
        let mut pipe = redis::pipe();
        pipe.atomic();
        RedisWriteBatch { pipe }
    }

    fn increment_member(&mut self, key: &[u8], member: &[u8], delta: f64) {
        self.pipe
            .cmd("ZINCRBY")
            .arg(key)
            .arg(delta)
            .arg(member)
            .ignore();
    }

    fn put_member(&mut self, key: &[u8], member: &[u8], score: f64) {
        self.pipe
            .cmd("ZADD")
            .arg(key)
            .arg(score)
            .arg(member)
            .ignore();
    }

    fn remove_member(&mut self, key: &[u8], member: &[u8]) {
        self.pipe.cmd("ZREM").arg(key).arg(member).ignore();
    }

    fn add_to_set(&mut self, key: &[u8], member: &[u8]) {
        self.pipe.cmd("SADD").arg(key).arg(member).ignore();
    }

    fn remove_from_set(&mut self, key: &[u8], member: &[u8]) {
        self.pipe.cmd("SREM").arg(key).arg(member).ignore();
    }

    fn delete_key(&mut self, key: &[u8]) {
        self.pipe.cmd("DEL").arg(key).ignore();
    }
}

fn unavailable(err: redis::RedisError) -> StoreError {
    StoreError::Unavailable {
        detail: err.to_string(),
    }
}

fn revrange_bounds(offset: u64, limit: u64) -> (i64, i64) {
    let start = offset.min(i64::MAX as u64) as i64;
    let stop = match offset.checked_add(limit) {
        Some(end) if end <= i64::MAX as u64 => (end - 1) as i64,
        _ => -1, // to the end of the set
    };
    (start, stop)
}
