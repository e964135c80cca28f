use super::cache_store::{CacheEntry, CacheStore};
use crate::shared::errors::{AppError, AppResult};
use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::Client;
use tracing::{debug, warn};

/// Redis-backed cache store
///
/// Entries are stored as a JSON envelope (payload + write time + TTL) under
/// their key with `SETEX`, so Redis enforces expiry on its own as well.
pub struct RedisCacheStore {
    connection: MultiplexedConnection,
}

impl RedisCacheStore {
    /// Open a client and establish the shared multiplexed connection
    pub async fn connect(redis_url: &str) -> AppResult<Self> {
        let client = Client::open(redis_url)
            .map_err(|e| AppError::CacheError(format!("Failed to connect to Redis: {}", e)))?;

        let connection = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| AppError::CacheError(format!("Redis connection failed: {}", e)))?;

        debug!("Connected to Redis cache");
        Ok(Self { connection })
    }

    /// Round-trip check used at startup
    pub async fn ping(&self) -> AppResult<()> {
        let mut conn = self.connection.clone();
        let _: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(|e| AppError::CacheError(format!("Redis ping failed: {}", e)))?;
        Ok(())
    }
}

#[async_trait]
impl CacheStore for RedisCacheStore {
    async fn get(&self, key: &str) -> AppResult<Option<CacheEntry>> {
        let mut conn = self.connection.clone();

        let data: Option<String> = redis::cmd("GET")
            .arg(key)
            .query_async(&mut conn)
            .await
            .map_err(|e| AppError::CacheError(format!("Failed to get from cache: {}", e)))?;

        let Some(json) = data else {
            return Ok(None);
        };

        match serde_json::from_str::<CacheEntry>(&json) {
            Ok(entry) => Ok(Some(entry)),
            Err(e) => {
                // Unreadable envelope: drop it so the next read is a clean miss
                warn!("Corrupt cache envelope for key {}: {}", key, e);
                self.delete(key).await?;
                Ok(None)
            }
        }
    }

    async fn set(&self, entry: CacheEntry) -> AppResult<()> {
        let mut conn = self.connection.clone();
        let json = serde_json::to_string(&entry)?;

        // SETEX rejects a zero expiry
        let expiry_secs = entry.ttl_seconds.max(1);

        redis::cmd("SETEX")
            .arg(&entry.key)
            .arg(expiry_secs)
            .arg(json)
            .query_async::<_, ()>(&mut conn)
            .await
            .map_err(|e| AppError::CacheError(format!("Failed to set cache: {}", e)))?;

        Ok(())
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        let mut conn = self.connection.clone();

        redis::cmd("DEL")
            .arg(key)
            .query_async::<_, ()>(&mut conn)
            .await
            .map_err(|e| AppError::CacheError(format!("Failed to delete from cache: {}", e)))?;

        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "redis"
    }
}
