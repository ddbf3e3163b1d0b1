//! Redis-backed key-value cache for multi-process deployments.
//!
//! `set_if_absent` maps to `SET key value NX PX ttl`, which is atomic on
//! the server. Expiry is handled natively by Redis.

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use std::time::Duration;

use crate::ports::{CacheError, KeyValueCache};

/// Redis cache. All keys are namespaced under `prefix`.
#[derive(Clone)]
pub struct RedisCache {
    conn: MultiplexedConnection,
    prefix: String,
}

impl RedisCache {
    pub fn new(conn: MultiplexedConnection) -> Self {
        Self {
            conn,
            prefix: "tourbook:".to_string(),
        }
    }

    /// Opens a multiplexed connection to `url`.
    pub async fn connect(url: &str) -> Result<Self, CacheError> {
        let client =
            redis::Client::open(url).map_err(|e| CacheError::Connection(e.to_string()))?;
        let conn = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| CacheError::Connection(e.to_string()))?;
        Ok(Self::new(conn))
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    fn key(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key)
    }
}

fn ttl_millis(ttl: Duration) -> u64 {
    (ttl.as_millis() as u64).max(1)
}

#[async_trait]
impl KeyValueCache for RedisCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut conn = self.conn.clone();
        conn.get(self.key(key))
            .await
            .map_err(|e: redis::RedisError| CacheError::Command(e.to_string()))
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        conn.pset_ex::<_, _, ()>(self.key(key), value, ttl_millis(ttl))
            .await
            .map_err(|e: redis::RedisError| CacheError::Command(e.to_string()))
    }

    async fn set_if_absent(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> Result<bool, CacheError> {
        let mut conn = self.conn.clone();
        let reply: Option<String> = redis::cmd("SET")
            .arg(self.key(key))
            .arg(value)
            .arg("NX")
            .arg("PX")
            .arg(ttl_millis(ttl))
            .query_async(&mut conn)
            .await
            .map_err(|e| CacheError::Command(e.to_string()))?;
        Ok(reply.is_some())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        conn.del::<_, ()>(self.key(key))
            .await
            .map_err(|e: redis::RedisError| CacheError::Command(e.to_string()))
    }
}
