use log::{debug, info};
use std::sync::Once;

static INIT: Once = Once::new();

/// Initialize the logging system
/// This should be called once at application startup
pub fn init_logger() {
    INIT.call_once(|| {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Info) // Default level
            .filter_module("anistream", log::LevelFilter::Debug) // More verbose for our crate
            .filter_module("reqwest", log::LevelFilter::Warn) // Reduce HTTP noise
            .filter_module("hyper", log::LevelFilter::Warn)
            .filter_module("redis", log::LevelFilter::Warn)
            .format_timestamp_secs()
            .format_target(false)
            .init();

        info!("Logging system initialized");
    });
}

/// Structured logging helpers for common patterns
pub struct LogContext;

impl LogContext {
    /// Upstream HTTP call; `None` marks the start
    pub fn api_call(provider: &str, endpoint: &str, status: &str, duration_ms: Option<u64>) {
        match duration_ms {
            Some(duration) => debug!(
                "{}: {} {} in {}ms",
                provider, endpoint, status, duration
            ),
            None => debug!("{}: Requesting {}", provider, endpoint),
        }
    }

    pub fn cache_lookup(key: &str, hit: bool) {
        if hit {
            debug!("Cache: HIT {}", key);
        } else {
            debug!("Cache: MISS {}", key);
        }
    }

    /// Outcome of one provider in an episode fan-out
    pub fn provider_listing(provider: &str, anime: &str, episodes: Option<usize>) {
        match episodes {
            Some(count) => debug!("{}: {} episodes for {}", provider, count, anime),
            None => debug!("{}: No episodes for {}", provider, anime),
        }
    }

    pub fn performance_metric(operation: &str, duration_ms: u64, additional_info: Option<&str>) {
        match additional_info {
            Some(info) => info!(
                "Performance: {} took {}ms ({})",
                operation, duration_ms, info
            ),
            None => info!("Performance: {} took {}ms", operation, duration_ms),
        }
    }
}

/// Wall-clock timer for one resolution, reported on finish
pub struct TimedOperation {
    start: std::time::Instant,
    operation: String,
}

impl TimedOperation {
    pub fn new(operation: &str) -> Self {
        debug!("Starting: {}", operation);
        Self {
            start: std::time::Instant::now(),
            operation: operation.to_string(),
        }
    }

    pub fn finish(self) -> u64 {
        let duration = self.start.elapsed().as_millis() as u64;
        LogContext::performance_metric(&self.operation, duration, None);
        duration
    }

    pub fn finish_with_info(self, info: &str) -> u64 {
        let duration = self.start.elapsed().as_millis() as u64;
        LogContext::performance_metric(&self.operation, duration, Some(info));
        duration
    }
}
