//! Read-through cache over the system of record.
//!
//! Reads consult the cache first and fall back to a loader; only values the
//! loader actually found are written back. Writers call [`ReadThroughCache::invalidate`]
//! or [`ReadThroughCache::invalidate_all`] with the precise keys a mutation
//! affects. A read failure never fails the caller, an invalidation failure
//! always does.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use warden_core::error::{AppError, ErrorKind};
use warden_core::result::AppResult;
use warden_core::traits::cache::CacheProvider;

/// JSON read-through cache with explicit, key-precise invalidation.
#[derive(Debug, Clone)]
pub struct ReadThroughCache {
    cache: Arc<dyn CacheProvider>,
    ttl: Duration,
}

impl ReadThroughCache {
    /// Wrap a provider; entries are written with `ttl`.
    pub fn new(cache: Arc<dyn CacheProvider>, ttl: Duration) -> Self {
        Self { cache, ttl }
    }

    /// TTL applied to every entry written by this layer.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Return the cached value for `key`, or run `loader` and cache a found
    /// value.
    pub async fn get_or_load<T, F, Fut>(&self, key: &str, loader: F) -> AppResult<Option<T>>
    where
        T: Serialize + DeserializeOwned + Send + Sync,
        F: FnOnce() -> Fut,
        Fut: Future<Output = AppResult<Option<T>>>,
    {
        match self.cache.get(key).await {
            Ok(Some(raw)) => match serde_json::from_str::<T>(&raw) {
                Ok(value) => {
                    debug!(key, "Cache hit");
                    return Ok(Some(value));
                }
                Err(e) => {
                    warn!(key, error = %e, "Discarding undecodable cache entry");
                    if let Err(e) = self.cache.delete(key).await {
                        warn!(key, error = %e, "Failed to drop undecodable cache entry");
                    }
                }
            },
            Ok(None) => debug!(key, "Cache miss"),
            Err(e) => warn!(key, error = %e, "Cache read failed, loading from store"),
        }

        let loaded = loader().await?;
        if let Some(value) = &loaded {
            if let Err(e) = self.put(key, value).await {
                warn!(key, error = %e, "Failed to populate cache after load");
            }
        }
        Ok(loaded)
    }

    /// Write `value` under `key`.
    pub async fn put<T>(&self, key: &str, value: &T) -> AppResult<()>
    where
        T: Serialize + Sync,
    {
        let json = serde_json::to_string(value)?;
        self.cache.set(key, &json, self.ttl).await
    }

    /// Remove `key`.
    pub async fn invalidate(&self, key: &str) -> AppResult<()> {
        self.cache.delete(key).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Cache,
                format!("Failed to invalidate cache key '{key}'"),
                e,
            )
        })?;
        debug!(key, "Cache key invalidated");
        Ok(())
    }

    /// Remove every key in `keys`.
    ///
    /// All keys are attempted; the first failure is returned.
    pub async fn invalidate_all<S: AsRef<str>>(&self, keys: &[S]) -> AppResult<()> {
        let mut first_error = None;
        for key in keys {
            if let Err(e) = self.invalidate(key.as_ref()).await {
                warn!(key = key.as_ref(), error = %e, "Cache invalidation failed");
                first_error.get_or_insert(e);
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use crate::memory::MemoryCacheProvider;
    use warden_core::config::cache::MemoryCacheConfig;

    fn layer() -> (ReadThroughCache, Arc<MemoryCacheProvider>) {
        let provider = Arc::new(MemoryCacheProvider::new(&MemoryCacheConfig {
            max_capacity: 100,
        }));
        (
            ReadThroughCache::new(provider.clone(), Duration::from_secs(60)),
            provider,
        )
    }

    /// A provider whose every call fails.
    #[derive(Debug)]
    struct Unreachable;

    #[async_trait]
    impl CacheProvider for Unreachable {
        async fn get(&self, _key: &str) -> AppResult<Option<String>> {
            Err(AppError::cache("connection refused"))
        }
        async fn set(&self, _key: &str, _value: &str, _ttl: Duration) -> AppResult<()> {
            Err(AppError::cache("connection refused"))
        }
        async fn delete(&self, _key: &str) -> AppResult<()> {
            Err(AppError::cache("connection refused"))
        }
        async fn health_check(&self) -> AppResult<bool> {
            Ok(false)
        }
    }

    #[tokio::test]
    async fn test_second_read_is_served_from_cache() {
        let (cache, _) = layer();
        let counter = AtomicUsize::new(0);
        let loads = &counter;
        let load = move || async move {
            loads.fetch_add(1, Ordering::SeqCst);
            Ok::<_, AppError>(Some("ann".to_string()))
        };

        assert_eq!(cache.get_or_load("k", load).await.unwrap(), Some("ann".into()));
        assert_eq!(cache.get_or_load("k", load).await.unwrap(), Some("ann".into()));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_absent_values_are_not_cached() {
        let (cache, provider) = layer();
        let value: Option<String> = cache
            .get_or_load("missing", || async { Ok(None) })
            .await
            .unwrap();
        assert!(value.is_none());
        assert_eq!(provider.get("missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_undecodable_entry_falls_back_to_loader() {
        let (cache, provider) = layer();
        provider
            .set("k", "not json", Duration::from_secs(60))
            .await
            .unwrap();

        let value: Option<u32> = cache.get_or_load("k", || async { Ok(Some(7)) }).await.unwrap();
        assert_eq!(value, Some(7));
        assert_eq!(provider.get("k").await.unwrap(), Some("7".to_string()));
    }

    #[tokio::test]
    async fn test_unreachable_cache_reads_through() {
        let cache = ReadThroughCache::new(Arc::new(Unreachable), Duration::from_secs(60));
        let value: Option<u32> = cache.get_or_load("k", || async { Ok(Some(7)) }).await.unwrap();
        assert_eq!(value, Some(7));
    }

    #[tokio::test]
    async fn test_invalidation_failure_is_reported() {
        let cache = ReadThroughCache::new(Arc::new(Unreachable), Duration::from_secs(60));
        let err = cache.invalidate_all(&["a", "b"]).await.unwrap_err();
        assert!(err.is(ErrorKind::Cache));
    }

    #[tokio::test]
    async fn test_invalidate_removes_entry() {
        let (cache, provider) = layer();
        cache.put("k", &1u32).await.unwrap();
        cache.invalidate_all(&["k".to_string()]).await.unwrap();
        assert_eq!(provider.get("k").await.unwrap(), None);
    }
}
