//! Key-value cache adapters.
//!
//! - `InMemoryCache` - single process, tests and local runs
//! - `RedisCache` - shared across replicas

mod in_memory;
mod redis;

pub use self::in_memory::InMemoryCache;
pub use self::redis::RedisCache;
