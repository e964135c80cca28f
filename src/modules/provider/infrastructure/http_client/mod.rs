pub mod rate_limit_client;

#[cfg(test)]
pub(crate) mod test_support;

pub use rate_limit_client::RateLimitClient;

use crate::shared::errors::{AppError, AppResult};

/// Adapters never fail a request: upstream errors end here as `None`
pub trait UpstreamResultExt<T> {
    fn or_log(self, provider: &str, what: &str) -> Option<T>;
}

impl<T> UpstreamResultExt<T> for AppResult<T> {
    fn or_log(self, provider: &str, what: &str) -> Option<T> {
        match self {
            Ok(value) => Some(value),
            Err(AppError::NotFound(message)) => {
                log::debug!("{}: {} not found ({})", provider, what, message);
                None
            }
            Err(e) => {
                log::warn!("{}: {} failed: {}", provider, what, e);
                None
            }
        }
    }
}
