//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `TOURBOOK` prefix and nested values are separated by double underscores.
//!
//! # Example
//!
//! ```no_run
//! use tourbook::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod cache;
mod database;
mod error;
mod payment;
mod redis;
mod server;

pub use cache::CacheConfig;
pub use database::DatabaseConfig;
pub use error::{ConfigError, ValidationError};
pub use payment::PaymentConfig;
pub use redis::RedisConfig;
pub use server::{Environment, ServerConfig};

use serde::Deserialize;

/// Root application configuration
///
/// Load using [`AppConfig::load()`] which reads from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port, environment, logging)
    #[serde(default)]
    pub server: ServerConfig,

    /// PostgreSQL; in-memory repositories when absent
    #[serde(default)]
    pub database: Option<DatabaseConfig>,

    /// Shared cache; process-local cache when absent
    #[serde(default)]
    pub redis: Option<RedisConfig>,

    /// Payment authority client
    pub payment: PaymentConfig,

    /// Dedup and entitlement cache timings
    #[serde(default)]
    pub cache: CacheConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `TOURBOOK` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `TOURBOOK__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `TOURBOOK__PAYMENT__ACCESS_TOKEN=...` -> `payment.access_token = ...`
    /// - `TOURBOOK__SERVER__SYSTEM_TOKEN=...` -> `server.system_token = ...`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Required environment variables are missing
    /// - Values cannot be parsed into expected types
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("TOURBOOK")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        if let Some(database) = &self.database {
            database.validate()?;
        }
        if let Some(redis) = &self.redis {
            redis.validate()?;
        }
        self.payment.validate(self.is_production())?;
        self.cache.validate()?;
        Ok(())
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}
