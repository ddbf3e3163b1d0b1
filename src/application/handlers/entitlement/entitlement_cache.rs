//! Cached entitlements with a single-flight refresh.
//!
//! Each user has one entry `{checked_at, value}` in the shared cache. An
//! entry younger than the freshness window is served as is. Otherwise the
//! caller that wins the `entitlements:lock:{user}` key reconciles and stores
//! a new entry; everyone else polls for it until the wait ceiling, then takes
//! whatever is cached.
//!
//! Invalidation writes a new token under `entitlements:generation:{user}`.
//! Every entry carries the token that was current when its reconciliation
//! started, and reads discard entries whose token no longer matches. A
//! refresh that overlapped an invalidation therefore cannot publish the
//! state it read before the invalidation.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use uuid::Uuid;

use crate::domain::entitlement::{EntitlementError, UserEntitlements};
use crate::domain::foundation::{Timestamp, UserId};
use crate::ports::KeyValueCache;

use super::{ReconcileEntitlementsCommand, ReconcileEntitlementsHandler};

/// Timing knobs for the entitlement cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntitlementCacheConfig {
    /// Age after which an entry is refreshed.
    pub freshness: Duration,
    /// How long stale entries remain readable as a fallback.
    pub entry_ttl: Duration,
    /// Expiry of the refresh lock, in case its holder dies.
    pub lock_ttl: Duration,
    pub poll_interval: Duration,
    pub wait_ceiling: Duration,
}

impl Default for EntitlementCacheConfig {
    fn default() -> Self {
        Self {
            freshness: Duration::from_secs(5 * 60),
            entry_ttl: Duration::from_secs(24 * 60 * 60),
            lock_ttl: Duration::from_secs(10),
            poll_interval: Duration::from_millis(100),
            wait_ceiling: Duration::from_secs(10),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CachedEntitlements {
    checked_at: i64,
    #[serde(default)]
    generation: Option<String>,
    value: UserEntitlements,
}

pub struct EntitlementCache {
    cache: Arc<dyn KeyValueCache>,
    reconciler: Arc<ReconcileEntitlementsHandler>,
    config: EntitlementCacheConfig,
}

impl EntitlementCache {
    pub fn new(
        cache: Arc<dyn KeyValueCache>,
        reconciler: Arc<ReconcileEntitlementsHandler>,
        config: EntitlementCacheConfig,
    ) -> Self {
        Self {
            cache,
            reconciler,
            config,
        }
    }

    /// Fresh entitlements for `user_id`, refreshing at most once across
    /// concurrent callers.
    ///
    /// # Errors
    ///
    /// `Unavailable` when another caller holds the refresh and nothing was
    /// cached before the wait ceiling.
    pub async fn entitlements_for(
        &self,
        user_id: &UserId,
    ) -> Result<UserEntitlements, EntitlementError> {
        self.get(user_id)
            .await?
            .ok_or_else(|| EntitlementError::Unavailable(user_id.clone()))
    }

    /// Like [`entitlements_for`](Self::entitlements_for) but returns `None`
    /// instead of failing when no value could be obtained.
    pub async fn get(&self, user_id: &UserId) -> Result<Option<UserEntitlements>, EntitlementError> {
        let cached = self.read(user_id).await?;
        if let Some(entry) = &cached {
            if self.is_fresh(entry) {
                return Ok(Some(entry.value.clone()));
            }
        }

        let lock_key = lock_key(user_id);
        let acquired = self
            .cache
            .set_if_absent(
                &lock_key,
                &Timestamp::now().as_unix_millis().to_string(),
                self.config.lock_ttl,
            )
            .await
            .map_err(|e| EntitlementError::cache(e.to_string()))?;

        if acquired {
            let refreshed = self.refresh(user_id).await;
            if let Err(e) = self.cache.delete(&lock_key).await {
                tracing::warn!(user_id = %user_id, error = %e, "Failed to release entitlement lock");
            }
            return refreshed.map(Some);
        }

        self.wait_for_refresh(user_id, cached).await
    }

    /// Starts a new generation and drops the cached entry, so the next read
    /// reconciles and refreshes already in flight are discarded.
    pub async fn invalidate(&self, user_id: &UserId) -> Result<(), EntitlementError> {
        self.cache
            .set(
                &generation_key(user_id),
                &Uuid::new_v4().to_string(),
                self.config.entry_ttl,
            )
            .await
            .map_err(|e| EntitlementError::cache(e.to_string()))?;
        self.cache
            .delete(&entry_key(user_id))
            .await
            .map_err(|e| EntitlementError::cache(e.to_string()))
    }

    /// Invalidates, then reconciles and caches the new value.
    ///
    /// Called after a subscription moved to `active` or `cancelled`.
    /// Failures are logged; the next read reconciles again.
    pub async fn resync(&self, user_id: &UserId) {
        if let Err(e) = self.invalidate(user_id).await {
            tracing::warn!(user_id = %user_id, error = %e, "Failed to invalidate entitlements");
        }
        match self.refresh(user_id).await {
            Ok(ents) => tracing::info!(
                user_id = %user_id,
                is_active = ents.is_active,
                roles = ?ents.roles,
                "Entitlements synchronized"
            ),
            Err(e) => {
                tracing::warn!(user_id = %user_id, error = %e, "Entitlement sync failed")
            }
        }
    }

    async fn refresh(&self, user_id: &UserId) -> Result<UserEntitlements, EntitlementError> {
        let generation = self.generation(user_id).await?;
        let value = self
            .reconciler
            .handle(ReconcileEntitlementsCommand {
                user_id: user_id.clone(),
            })
            .await?;

        let entry = CachedEntitlements {
            checked_at: Timestamp::now().as_unix_millis(),
            generation,
            value: value.clone(),
        };
        match serde_json::to_string(&entry) {
            Ok(json) => {
                if let Err(e) = self
                    .cache
                    .set(&entry_key(user_id), &json, self.config.entry_ttl)
                    .await
                {
                    tracing::warn!(user_id = %user_id, error = %e, "Failed to cache entitlements");
                }
            }
            Err(e) => {
                tracing::warn!(user_id = %user_id, error = %e, "Failed to encode entitlements")
            }
        }
        Ok(value)
    }

    async fn wait_for_refresh(
        &self,
        user_id: &UserId,
        mut latest: Option<CachedEntitlements>,
    ) -> Result<Option<UserEntitlements>, EntitlementError> {
        let deadline = Instant::now() + self.config.wait_ceiling;
        while Instant::now() < deadline {
            tokio::time::sleep(self.config.poll_interval).await;
            if let Some(entry) = self.read(user_id).await? {
                if self.is_fresh(&entry) {
                    return Ok(Some(entry.value));
                }
                latest = Some(entry);
            }
        }

        tracing::warn!(
            user_id = %user_id,
            stale = latest.is_some(),
            "Gave up waiting for entitlement refresh"
        );
        Ok(latest.map(|entry| entry.value))
    }

    async fn read(&self, user_id: &UserId) -> Result<Option<CachedEntitlements>, EntitlementError> {
        let raw = self
            .cache
            .get(&entry_key(user_id))
            .await
            .map_err(|e| EntitlementError::cache(e.to_string()))?;
        let Some(json) = raw else {
            return Ok(None);
        };

        let entry: CachedEntitlements = match serde_json::from_str(&json) {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(user_id = %user_id, error = %e, "Discarding unreadable entitlement entry");
                return Ok(None);
            }
        };

        if entry.generation != self.generation(user_id).await? {
            tracing::debug!(user_id = %user_id, "Discarding superseded entitlement entry");
            return Ok(None);
        }
        Ok(Some(entry))
    }

    async fn generation(&self, user_id: &UserId) -> Result<Option<String>, EntitlementError> {
        self.cache
            .get(&generation_key(user_id))
            .await
            .map_err(|e| EntitlementError::cache(e.to_string()))
    }

    fn is_fresh(&self, entry: &CachedEntitlements) -> bool {
        let age_ms = Timestamp::now().as_unix_millis() - entry.checked_at;
        age_ms >= 0 && (age_ms as u128) < self.config.freshness.as_millis()
    }
}

fn entry_key(user_id: &UserId) -> String {
    format!("entitlements:{}", user_id)
}

fn lock_key(user_id: &UserId) -> String {
    format!("entitlements:lock:{}", user_id)
}

fn generation_key(user_id: &UserId) -> String {
    format!("entitlements:generation:{}", user_id)
}
