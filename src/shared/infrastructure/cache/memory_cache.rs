use super::cache_store::{CacheEntry, CacheStore};
use crate::shared::errors::AppResult;
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Cache statistics for monitoring
#[derive(Debug, Clone, Default)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries_count: usize,
    pub expired_cleanups: u64,
    pub evictions: u64,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        if self.hits + self.misses == 0 {
            0.0
        } else {
            self.hits as f64 / (self.hits + self.misses) as f64
        }
    }
}

/// Process-local cache store with TTL support
///
/// Expiry is checked on every read; expired entries are also swept
/// opportunistically on writes so the map does not grow without bound.
#[derive(Debug)]
pub struct InMemoryCacheStore {
    cache: Arc<DashMap<String, CacheEntry>>,
    hits: AtomicU64,
    misses: AtomicU64,
    cleanups: AtomicU64,
    evictions: AtomicU64,
    max_entries: usize,
}

impl InMemoryCacheStore {
    pub fn new(max_entries: usize) -> Self {
        Self {
            cache: Arc::new(DashMap::new()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            cleanups: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
            max_entries: max_entries.max(1),
        }
    }

    /// Number of stored entries, expired ones included until swept
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.cache.contains_key(key)
    }

    /// Get current cache statistics
    pub fn get_stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries_count: self.cache.len(),
            expired_cleanups: self.cleanups.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
        }
    }

    /// Remove every expired entry, returning how many were dropped
    pub fn cleanup_expired(&self) -> usize {
        let expired_keys: Vec<String> = self
            .cache
            .iter()
            .filter(|entry| entry.value().is_expired())
            .map(|entry| entry.key().clone())
            .collect();

        let expired_count = expired_keys.len();
        for key in expired_keys {
            self.cache.remove(&key);
        }

        if expired_count > 0 {
            self.cleanups
                .fetch_add(expired_count as u64, Ordering::Relaxed);
            debug!("Cleaned up {} expired cache entries", expired_count);
        }
        expired_count
    }

    /// Evict oldest entries when cache is full
    fn evict_oldest_entries(&self) {
        let current_size = self.cache.len();
        if current_size < self.max_entries {
            return;
        }

        let mut entries: Vec<(String, chrono::DateTime<chrono::Utc>)> = self
            .cache
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().written_at))
            .collect();

        // Sort by write time (oldest first)
        entries.sort_by_key(|(_, written_at)| *written_at);

        // Get back to 90% of max capacity
        let target_size = (self.max_entries * 9) / 10;
        let entries_to_evict = current_size.saturating_sub(target_size).max(1);

        for (key, _) in entries.into_iter().take(entries_to_evict) {
            self.cache.remove(&key);
        }
        self.evictions
            .fetch_add(entries_to_evict as u64, Ordering::Relaxed);

        debug!(
            "Evicted {} old cache entries (was {}, now {})",
            entries_to_evict,
            current_size,
            self.cache.len()
        );
    }
}

impl Default for InMemoryCacheStore {
    fn default() -> Self {
        Self::new(10_000)
    }
}

#[async_trait]
impl CacheStore for InMemoryCacheStore {
    async fn get(&self, key: &str) -> AppResult<Option<CacheEntry>> {
        let found = self.cache.get(key).map(|entry| entry.value().clone());

        match found {
            Some(entry) if !entry.is_expired() => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Ok(Some(entry))
            }
            Some(_) => {
                self.cache.remove(key);
                self.cleanups.fetch_add(1, Ordering::Relaxed);
                self.misses.fetch_add(1, Ordering::Relaxed);
                debug!("Removed expired cache entry for key: {}", key);
                Ok(None)
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                Ok(None)
            }
        }
    }

    async fn set(&self, entry: CacheEntry) -> AppResult<()> {
        // Occasional sweep (~4% of writes)
        if rand::random::<u8>() < 10 {
            self.cleanup_expired();
        }

        if !self.cache.contains_key(&entry.key) && self.cache.len() >= self.max_entries {
            self.cleanup_expired();
            self.evict_oldest_entries();
        }

        debug!(
            "Cached entry for key: {} with TTL: {}s",
            entry.key, entry.ttl_seconds
        );
        self.cache.insert(entry.key.clone(), entry);
        Ok(())
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.cache.remove(key);
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
