//! Backend-agnostic key/value cache used by the read-through layer.

use std::time::Duration;

use async_trait::async_trait;

use crate::result::AppResult;

/// String key/value store with per-entry expiry.
///
/// Values are opaque strings; the read-through layer owns their encoding.
/// Keys are passed unprefixed and each backend applies its own namespace.
#[async_trait]
pub trait CacheProvider: Send + Sync + std::fmt::Debug + 'static {
    /// Value stored under `key`, or `None` when missing or expired.
    async fn get(&self, key: &str) -> AppResult<Option<String>>;

    /// Store `value` under `key` for at most `ttl`.
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> AppResult<()>;

    /// Remove `key`. Removing a missing key succeeds.
    async fn delete(&self, key: &str) -> AppResult<()>;

    /// Round-trip to the backend. `Ok(false)` means reachable but unhealthy.
    async fn health_check(&self) -> AppResult<bool>;
}
