//! Engine configuration
//!
//! Every upstream base URL, timeout, rate limit and hand-tuned constant lives
//! here so nothing in the resolution path is a magic number. Values come from
//! the environment (a `.env` file is honoured through `dotenvy`) and fall back
//! to production defaults.

use crate::shared::errors::{AppError, AppResult};
use std::str::FromStr;
use std::time::Duration;

const MIN_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const MAX_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Base URLs of every upstream the engine talks to
#[derive(Debug, Clone)]
pub struct UpstreamUrls {
    /// Identifier lookup A (site slugs)
    pub malsync: String,
    /// Identifier lookup B (cross-catalog id mapping)
    pub arm: String,
    /// aniwatch-style HiAnime API
    pub hianime: String,
    /// Consumet instance hosting the gogoanime and animepahe routes
    pub consumet: String,
    /// Anify (direct episodes by canonical id, universal sources)
    pub anify: String,
    /// Episode metadata service
    pub anizip: String,
    /// Metadata catalog (GraphQL)
    pub anilist: String,
}

impl Default for UpstreamUrls {
    fn default() -> Self {
        Self {
            malsync: "https://api.malsync.moe".to_string(),
            arm: "https://arm.haglund.dev".to_string(),
            hianime: "https://aniwatch-api.vercel.app".to_string(),
            consumet: "https://api.consumet.org".to_string(),
            anify: "https://api.anify.tv".to_string(),
            anizip: "https://api.ani.zip".to_string(),
            anilist: "https://graphql.anilist.co".to_string(),
        }
    }
}

/// Token bucket settings for one upstream
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateLimitSettings {
    pub requests_per_second: f64,
    pub burst: u32,
}

impl RateLimitSettings {
    pub const fn new(requests_per_second: f64, burst: u32) -> Self {
        Self {
            requests_per_second,
            burst,
        }
    }
}

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub upstreams: UpstreamUrls,
    /// Upper bound for every upstream call, rate-limiter wait included
    pub request_timeout: Duration,
    pub user_agent: String,
    pub default_rate_limit: RateLimitSettings,
    /// AniList is far stricter than the scraping APIs
    pub anilist_rate_limit: RateLimitSettings,

    pub video_ttl: Duration,
    pub airing_episodes_ttl: Duration,
    pub finished_episodes_ttl: Duration,
    pub identifier_ttl: Duration,

    /// Title-match acceptance threshold (strictly greater than)
    pub title_match_threshold: f64,

    /// When set, the cache lives in Redis instead of process memory
    pub redis_url: Option<String>,
    pub cache_max_entries: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            upstreams: UpstreamUrls::default(),
            request_timeout: Duration::from_secs(12),
            user_agent: "anistream/0.1 (+https://github.com/anistream/anistream)".to_string(),
            default_rate_limit: RateLimitSettings::new(5.0, 10),
            anilist_rate_limit: RateLimitSettings::new(0.5, 2),
            video_ttl: Duration::from_secs(25 * 60),
            airing_episodes_ttl: Duration::from_secs(6 * 60 * 60),
            finished_episodes_ttl: Duration::from_secs(45 * 24 * 60 * 60),
            identifier_ttl: Duration::from_secs(24 * 60 * 60),
            title_match_threshold: 0.6,
            redis_url: None,
            cache_max_entries: 10_000,
        }
    }
}

impl EngineConfig {
    /// Build the configuration from environment variables
    ///
    /// Unset variables keep their defaults; set-but-unparseable variables are
    /// a configuration error rather than being silently ignored.
    pub fn from_env() -> AppResult<Self> {
        let defaults = Self::default();
        let upstreams = UpstreamUrls {
            malsync: env_string("ANISTREAM_MALSYNC_URL", defaults.upstreams.malsync),
            arm: env_string("ANISTREAM_ARM_URL", defaults.upstreams.arm),
            hianime: env_string("ANISTREAM_HIANIME_URL", defaults.upstreams.hianime),
            consumet: env_string("ANISTREAM_CONSUMET_URL", defaults.upstreams.consumet),
            anify: env_string("ANISTREAM_ANIFY_URL", defaults.upstreams.anify),
            anizip: env_string("ANISTREAM_ANIZIP_URL", defaults.upstreams.anizip),
            anilist: env_string("ANISTREAM_ANILIST_URL", defaults.upstreams.anilist),
        };

        let config = Self {
            upstreams,
            request_timeout: Duration::from_secs(env_parse(
                "ANISTREAM_TIMEOUT_SECS",
                defaults.request_timeout.as_secs(),
            )?),
            user_agent: env_string("ANISTREAM_USER_AGENT", defaults.user_agent),
            default_rate_limit: RateLimitSettings::new(
                env_parse(
                    "ANISTREAM_RATE_LIMIT_RPS",
                    defaults.default_rate_limit.requests_per_second,
                )?,
                env_parse("ANISTREAM_RATE_LIMIT_BURST", defaults.default_rate_limit.burst)?,
            ),
            anilist_rate_limit: defaults.anilist_rate_limit,
            video_ttl: Duration::from_secs(env_parse(
                "ANISTREAM_VIDEO_TTL_SECS",
                defaults.video_ttl.as_secs(),
            )?),
            airing_episodes_ttl: Duration::from_secs(env_parse(
                "ANISTREAM_AIRING_TTL_SECS",
                defaults.airing_episodes_ttl.as_secs(),
            )?),
            finished_episodes_ttl: Duration::from_secs(env_parse(
                "ANISTREAM_FINISHED_TTL_SECS",
                defaults.finished_episodes_ttl.as_secs(),
            )?),
            identifier_ttl: Duration::from_secs(env_parse(
                "ANISTREAM_IDENTIFIER_TTL_SECS",
                defaults.identifier_ttl.as_secs(),
            )?),
            title_match_threshold: env_parse(
                "ANISTREAM_MATCH_THRESHOLD",
                defaults.title_match_threshold,
            )?,
            redis_url: std::env::var("REDIS_URL").ok().filter(|s| !s.trim().is_empty()),
            cache_max_entries: env_parse("ANISTREAM_CACHE_MAX_ENTRIES", defaults.cache_max_entries)?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration
    pub fn validate(&self) -> AppResult<()> {
        if self.request_timeout < MIN_REQUEST_TIMEOUT || self.request_timeout > MAX_REQUEST_TIMEOUT {
            return Err(AppError::ConfigError(format!(
                "Request timeout must be between 10 and 15 seconds, got {:?}",
                self.request_timeout
            )));
        }

        if !(0.0..=1.0).contains(&self.title_match_threshold) {
            return Err(AppError::ConfigError(format!(
                "Title match threshold must be within 0.0..=1.0, got {}",
                self.title_match_threshold
            )));
        }

        for (name, ttl) in [
            ("video", self.video_ttl),
            ("airing episodes", self.airing_episodes_ttl),
            ("finished episodes", self.finished_episodes_ttl),
            ("identifier", self.identifier_ttl),
        ] {
            if ttl.is_zero() {
                return Err(AppError::ConfigError(format!("{} TTL cannot be zero", name)));
            }
        }

        for limit in [self.default_rate_limit, self.anilist_rate_limit] {
            if limit.requests_per_second <= 0.0 || limit.burst == 0 {
                return Err(AppError::ConfigError(format!(
                    "Rate limit must allow at least one request, got {:?}",
                    limit
                )));
            }
        }

        if self.cache_max_entries == 0 {
            return Err(AppError::ConfigError(
                "Cache must hold at least one entry".to_string(),
            ));
        }

        Ok(())
    }
}

fn env_string(key: &str, default: String) -> String {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().trim_end_matches('/').to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or(default)
}

fn env_parse<T>(key: &str, default: T) -> AppResult<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw.trim().parse::<T>().map_err(|e| {
            AppError::ConfigError(format!("Invalid value '{}' for {}: {}", raw, key, e))
        }),
        _ => Ok(default),
    }
}
