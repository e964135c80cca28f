pub mod cache_layer;
pub mod cache_store;
pub mod memory_cache;
pub mod redis_cache;

pub use cache_layer::{CacheLayer, Cacheable};
pub use cache_store::{CacheEntry, CacheStore};
pub use memory_cache::{CacheStats, InMemoryCacheStore};
pub use redis_cache::RedisCacheStore;

#[cfg(test)]
pub use cache_store::MockCacheStore;
