//! Shared key-value cache port.
//!
//! Backs webhook deduplication and the entitlement single-flight cache.
//! Implementations must make `set_if_absent` atomic across every process
//! sharing the cache.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Port for a TTL key-value store with atomic check-and-set.
#[async_trait]
pub trait KeyValueCache: Send + Sync {
    /// Returns the value stored under `key`, if present and not expired.
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Stores `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError>;

    /// Stores `value` only if `key` is absent. Returns true if stored.
    async fn set_if_absent(&self, key: &str, value: &str, ttl: Duration)
        -> Result<bool, CacheError>;

    /// Removes `key`. Missing keys are not an error.
    async fn delete(&self, key: &str) -> Result<(), CacheError>;
}

/// Errors from cache operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CacheError {
    #[error("Cache connection error: {0}")]
    Connection(String),

    #[error("Cache command failed: {0}")]
    Command(String),
}
