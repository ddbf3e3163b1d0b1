//! Cache timing configuration
//!
//! Webhook dedup lifetime and the entitlement cache's freshness and
//! single-flight timings.

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Cache timing configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// How long a webhook signature suppresses redeliveries, in seconds
    #[serde(default = "default_webhook_dedup_ttl")]
    pub webhook_dedup_ttl_secs: u64,

    /// Age after which cached entitlements are recomputed, in seconds
    #[serde(default = "default_entitlement_freshness")]
    pub entitlement_freshness_secs: u64,

    /// Lifetime of a cached entitlement entry, in seconds
    #[serde(default = "default_entitlement_ttl")]
    pub entitlement_ttl_secs: u64,

    /// Expiry of the single-flight refresh lock, in seconds
    #[serde(default = "default_refresh_lock_ttl")]
    pub refresh_lock_ttl_secs: u64,

    /// Interval between polls while another caller refreshes, in milliseconds
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,

    /// Maximum wait for another caller's refresh, in milliseconds
    #[serde(default = "default_wait_ceiling")]
    pub wait_ceiling_ms: u64,
}

impl CacheConfig {
    pub fn webhook_dedup_ttl(&self) -> Duration {
        Duration::from_secs(self.webhook_dedup_ttl_secs)
    }

    pub fn entitlement_freshness(&self) -> Duration {
        Duration::from_secs(self.entitlement_freshness_secs)
    }

    pub fn entitlement_ttl(&self) -> Duration {
        Duration::from_secs(self.entitlement_ttl_secs)
    }

    pub fn refresh_lock_ttl(&self) -> Duration {
        Duration::from_secs(self.refresh_lock_ttl_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn wait_ceiling(&self) -> Duration {
        Duration::from_millis(self.wait_ceiling_ms)
    }

    /// Validate cache timings
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.webhook_dedup_ttl_secs == 0 {
            return Err(ValidationError::InvalidCacheTiming("webhook_dedup_ttl_secs"));
        }
        if self.entitlement_freshness_secs == 0
            || self.entitlement_freshness_secs > self.entitlement_ttl_secs
        {
            return Err(ValidationError::InvalidCacheTiming(
                "entitlement_freshness_secs",
            ));
        }
        if self.refresh_lock_ttl_secs == 0 {
            return Err(ValidationError::InvalidCacheTiming("refresh_lock_ttl_secs"));
        }
        if self.poll_interval_ms == 0 || self.poll_interval_ms > self.wait_ceiling_ms {
            return Err(ValidationError::InvalidCacheTiming("poll_interval_ms"));
        }
        Ok(())
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            webhook_dedup_ttl_secs: default_webhook_dedup_ttl(),
            entitlement_freshness_secs: default_entitlement_freshness(),
            entitlement_ttl_secs: default_entitlement_ttl(),
            refresh_lock_ttl_secs: default_refresh_lock_ttl(),
            poll_interval_ms: default_poll_interval(),
            wait_ceiling_ms: default_wait_ceiling(),
        }
    }
}

fn default_webhook_dedup_ttl() -> u64 {
    24 * 60 * 60
}

fn default_entitlement_freshness() -> u64 {
    5 * 60
}

fn default_entitlement_ttl() -> u64 {
    24 * 60 * 60
}

fn default_refresh_lock_ttl() -> u64 {
    10
}

fn default_poll_interval() -> u64 {
    100
}

fn default_wait_ceiling() -> u64 {
    10_000
}
