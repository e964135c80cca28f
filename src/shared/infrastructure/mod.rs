/// Shared infrastructure concerns
///
/// This module contains infrastructure implementations that are shared across
/// multiple bounded contexts (modules).
pub mod cache;

// Re-exports for convenience
pub use cache::{CacheEntry, CacheLayer, CacheStore, Cacheable, InMemoryCacheStore, RedisCacheStore};
