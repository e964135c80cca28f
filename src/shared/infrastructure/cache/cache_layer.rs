use super::cache_store::{CacheEntry, CacheStore};
use crate::shared::errors::AppResult;
use crate::shared::utils::logger::LogContext;
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Values that may be written to the cache
///
/// Lets a type veto its own persistence, e.g. a video resolution without any
/// playable source.
pub trait Cacheable {
    fn is_cacheable(&self) -> bool {
        true
    }
}

/// Typed cache-aside facade over an injected [`CacheStore`]
///
/// The cache never fails a request: backend errors degrade to a miss on read
/// and to a skipped write on store. A payload that no longer decodes is
/// deleted and reported as a miss.
#[derive(Clone)]
pub struct CacheLayer {
    store: Arc<dyn CacheStore>,
}

impl CacheLayer {
    pub fn new(store: Arc<dyn CacheStore>) -> Self {
        Self { store }
    }

    /// Read and decode a cached value
    pub async fn get_json<T>(&self, key: &str) -> Option<T>
    where
        T: DeserializeOwned,
    {
        let entry = match self.store.get(key).await {
            Ok(Some(entry)) => entry,
            Ok(None) => {
                LogContext::cache_lookup(key, false);
                return None;
            }
            Err(e) => {
                warn!(
                    "Cache read failed on {} backend for {}: {}",
                    self.store.backend_name(),
                    key,
                    e
                );
                return None;
            }
        };

        if entry.is_expired() {
            debug!("Cache entry {} past its TTL, treating as miss", key);
            self.delete_quietly(key).await;
            return None;
        }

        match serde_json::from_str::<T>(&entry.payload) {
            Ok(value) => {
                LogContext::cache_lookup(key, true);
                Some(value)
            }
            Err(e) => {
                warn!("Discarding undecodable cache entry {}: {}", key, e);
                self.delete_quietly(key).await;
                None
            }
        }
    }

    /// Encode and store a value; returns whether it was actually written
    pub async fn put_json<T>(&self, key: &str, value: &T, ttl: Duration) -> bool
    where
        T: Serialize + Cacheable,
    {
        if !value.is_cacheable() {
            debug!("Refusing to cache non-cacheable value under {}", key);
            return false;
        }

        let payload = match serde_json::to_string(value) {
            Ok(payload) => payload,
            Err(e) => {
                warn!("Failed to serialize cache value for {}: {}", key, e);
                return false;
            }
        };

        match self.store.set(CacheEntry::new(key, payload, ttl)).await {
            Ok(()) => {
                debug!("Cached {} with TTL {}s", key, ttl.as_secs());
                true
            }
            Err(e) => {
                warn!(
                    "Cache write failed on {} backend for {}: {}",
                    self.store.backend_name(),
                    key,
                    e
                );
                false
            }
        }
    }

    /// Explicit invalidation; callers decide whether a failure matters
    pub async fn invalidate(&self, key: &str) -> AppResult<()> {
        debug!("Invalidating cache key {}", key);
        self.store.delete(key).await
    }

    async fn delete_quietly(&self, key: &str) {
        if let Err(e) = self.store.delete(key).await {
            warn!("Failed to delete cache entry {}: {}", key, e);
        }
    }
}

impl Cacheable for String {
    fn is_cacheable(&self) -> bool {
        !self.trim().is_empty()
    }
}

impl<T> Cacheable for Vec<T> {
    fn is_cacheable(&self) -> bool {
        !self.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::errors::AppError;
    use crate::shared::infrastructure::cache::{InMemoryCacheStore, MockCacheStore};
    use mockall::predicate::eq;

    fn memory_layer() -> (Arc<InMemoryCacheStore>, CacheLayer) {
        let store = Arc::new(InMemoryCacheStore::new(100));
        let layer = CacheLayer::new(store.clone());
        (store, layer)
    }

    #[tokio::test]
    async fn test_round_trip() {
        let (_, layer) = memory_layer();
        let value = vec!["a".to_string(), "b".to_string()];
        assert!(layer.put_json("k", &value, Duration::from_secs(60)).await);
        assert_eq!(layer.get_json::<Vec<String>>("k").await, Some(value));
    }

    #[tokio::test]
    async fn test_non_cacheable_value_is_not_written() {
        let (store, layer) = memory_layer();
        let empty: Vec<String> = vec![];
        assert!(!layer.put_json("k", &empty, Duration::from_secs(60)).await);
        assert!(!store.contains_key("k"));
    }

    #[tokio::test]
    async fn test_corrupt_payload_is_deleted_and_missed() {
        let (store, layer) = memory_layer();
        store
            .set(CacheEntry::new(
                "k",
                "{not json".to_string(),
                Duration::from_secs(60),
            ))
            .await
            .unwrap();

        assert_eq!(layer.get_json::<Vec<String>>("k").await, None);
        assert!(!store.contains_key("k"));
    }

    #[tokio::test]
    async fn test_shape_mismatch_is_self_healing() {
        let (store, layer) = memory_layer();
        layer
            .put_json("k", &vec![1u32, 2, 3], Duration::from_secs(60))
            .await;

        // Cached under an older schema: decode fails, entry goes away
        assert_eq!(layer.get_json::<Vec<String>>("k").await, None);
        assert!(!store.contains_key("k"));
    }

    #[tokio::test]
    async fn test_expired_entry_from_backend_is_a_miss() {
        let mut store = MockCacheStore::new();
        let mut stale = CacheEntry::new("k", "[\"x\"]".to_string(), Duration::from_secs(10));
        stale.written_at = chrono::Utc::now() - chrono::Duration::seconds(11);
        store
            .expect_get()
            .with(eq("k"))
            .returning(move |_| Ok(Some(stale.clone())));
        store
            .expect_delete()
            .with(eq("k"))
            .times(1)
            .returning(|_| Ok(()));

        let layer = CacheLayer::new(Arc::new(store));
        assert_eq!(layer.get_json::<Vec<String>>("k").await, None);
    }

    #[tokio::test]
    async fn test_backend_failure_degrades_to_miss() {
        let mut store = MockCacheStore::new();
        store
            .expect_get()
            .returning(|_| Err(AppError::CacheError("connection refused".into())));
        store.expect_backend_name().return_const("mock");

        let layer = CacheLayer::new(Arc::new(store));
        assert_eq!(layer.get_json::<Vec<String>>("k").await, None);
    }

    #[tokio::test]
    async fn test_backend_write_failure_reports_false() {
        let mut store = MockCacheStore::new();
        store
            .expect_set()
            .returning(|_| Err(AppError::CacheError("read only replica".into())));
        store.expect_backend_name().return_const("mock");

        let layer = CacheLayer::new(Arc::new(store));
        assert!(
            !layer
                .put_json("k", &vec!["v".to_string()], Duration::from_secs(60))
                .await
        );
    }
}
