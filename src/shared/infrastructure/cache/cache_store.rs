use crate::shared::errors::AppResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// TTLs are clamped to a century so expiry arithmetic cannot overflow
const MAX_TTL_SECONDS: u64 = 100 * 365 * 24 * 60 * 60;

/// A single cached payload with its own TTL
///
/// The payload is kept as JSON text so every backend stores the same bytes
/// and decoding happens in one place ([`super::CacheLayer`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub key: String,
    pub payload: String,
    pub written_at: DateTime<Utc>,
    pub ttl_seconds: u64,
}

impl CacheEntry {
    pub fn new(key: impl Into<String>, payload: String, ttl: Duration) -> Self {
        Self {
            key: key.into(),
            payload,
            written_at: Utc::now(),
            ttl_seconds: ttl.as_secs(),
        }
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        let ttl = chrono::Duration::seconds(self.ttl_seconds.min(MAX_TTL_SECONDS) as i64);
        self.written_at
            .checked_add_signed(ttl)
            .unwrap_or(self.written_at)
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at()
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Seconds left before expiry, zero once expired
    pub fn remaining_ttl(&self) -> Duration {
        let remaining = self.expires_at() - Utc::now();
        remaining.to_std().unwrap_or(Duration::ZERO)
    }
}

/// Key/value backend behind the cache layer
///
/// Injected explicitly into the services that need it; implementations own
/// their connection lifecycle.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Fetch a raw entry. Backends may return expired entries; the cache layer
    /// re-checks expiry.
    async fn get(&self, key: &str) -> AppResult<Option<CacheEntry>>;

    async fn set(&self, entry: CacheEntry) -> AppResult<()>;

    async fn delete(&self, key: &str) -> AppResult<()>;

    fn backend_name(&self) -> &'static str;
}
