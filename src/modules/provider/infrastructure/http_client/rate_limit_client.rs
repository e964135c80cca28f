//! Rate-limited, time-bounded HTTP client shared by every upstream adapter
//!
//! One instance per upstream. Each call waits for the upstream's token bucket
//! and then runs under a single deadline that covers the limiter wait, the
//! request and reading the body. There are no retries: a failed call is
//! reported once and the orchestrator falls back to the next source.

use crate::shared::config::{EngineConfig, RateLimitSettings};
use crate::shared::errors::{AppError, AppResult};
use crate::shared::utils::logger::LogContext;
use governor::{Quota, RateLimiter as GovernorRateLimiter};
use reqwest::{Client, Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::num::NonZeroU32;
use std::time::{Duration, Instant};

type DirectRateLimiter = GovernorRateLimiter<
    governor::state::direct::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
    governor::middleware::NoOpMiddleware,
>;

pub struct RateLimitClient {
    client: Client,
    rate_limiter: DirectRateLimiter,
    timeout: Duration,
    provider_name: String,
}

impl RateLimitClient {
    /// Client for a scraping API using the engine-wide limits
    pub fn from_config(provider_name: &str, config: &EngineConfig) -> AppResult<Self> {
        Self::new(
            provider_name,
            config.default_rate_limit,
            config.request_timeout,
            &config.user_agent,
        )
    }

    /// AniList: 30 req/min in its degraded state, so 0.5 req/sec
    pub fn for_anilist(config: &EngineConfig) -> AppResult<Self> {
        Self::new(
            "AniList",
            config.anilist_rate_limit,
            config.request_timeout,
            &config.user_agent,
        )
    }

    pub fn new(
        provider_name: &str,
        rate_limit: RateLimitSettings,
        timeout: Duration,
        user_agent: &str,
    ) -> AppResult<Self> {
        if timeout.is_zero() {
            return Err(AppError::ConfigError(format!(
                "{} client needs a non-zero timeout",
                provider_name
            )));
        }

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| {
                AppError::ConfigError(format!(
                    "Failed to build {} HTTP client: {}",
                    provider_name, e
                ))
            })?;

        Ok(Self {
            client,
            rate_limiter: Self::create_rate_limiter(provider_name, rate_limit)?,
            timeout,
            provider_name: provider_name.to_string(),
        })
    }

    fn create_rate_limiter(
        provider_name: &str,
        settings: RateLimitSettings,
    ) -> AppResult<DirectRateLimiter> {
        if settings.requests_per_second <= 0.0 || !settings.requests_per_second.is_finite() {
            return Err(AppError::ConfigError(format!(
                "{} rate limit must be positive, got {}",
                provider_name, settings.requests_per_second
            )));
        }

        let period = Duration::from_secs_f64(1.0 / settings.requests_per_second);
        let burst = NonZeroU32::new(settings.burst.max(1)).ok_or_else(|| {
            AppError::ConfigError(format!("{} burst must be at least 1", provider_name))
        })?;
        let quota = Quota::with_period(period)
            .ok_or_else(|| {
                AppError::ConfigError(format!(
                    "{} rate limit period must be non-zero",
                    provider_name
                ))
            })?
            .allow_burst(burst);

        Ok(GovernorRateLimiter::direct(quota))
    }

    pub async fn get<T>(&self, url: &str) -> AppResult<T>
    where
        T: DeserializeOwned,
    {
        self.execute(Method::GET, url, &[], None).await
    }

    /// GET with query parameters; values are URL-encoded by reqwest
    pub async fn get_with_query<T>(&self, url: &str, query: &[(&str, String)]) -> AppResult<T>
    where
        T: DeserializeOwned,
    {
        self.execute(Method::GET, url, query, None).await
    }

    pub async fn post_json<T>(&self, url: &str, body: &Value) -> AppResult<T>
    where
        T: DeserializeOwned,
    {
        self.execute(Method::POST, url, &[], Some(body)).await
    }

    async fn execute<T>(
        &self,
        method: Method,
        url: &str,
        query: &[(&str, String)],
        body: Option<&Value>,
    ) -> AppResult<T>
    where
        T: DeserializeOwned,
    {
        let started = Instant::now();
        LogContext::api_call(&self.provider_name, url, "", None);

        let outcome = tokio::time::timeout(self.timeout, async {
            self.rate_limiter.until_ready().await;
            let response = self.build_and_send_request(&method, url, query, body).await?;
            let response = self.check_status(response, url)?;
            self.parse_response(response).await
        })
        .await;

        let result = match outcome {
            Ok(result) => result,
            Err(_) => Err(AppError::Timeout(format!(
                "{} request to {} exceeded {:?}",
                self.provider_name, url, self.timeout
            ))),
        };

        let status = if result.is_ok() { "ok" } else { "failed" };
        LogContext::api_call(
            &self.provider_name,
            url,
            status,
            Some(started.elapsed().as_millis() as u64),
        );
        result
    }

    async fn build_and_send_request(
        &self,
        method: &Method,
        url: &str,
        query: &[(&str, String)],
        body: Option<&Value>,
    ) -> AppResult<Response> {
        let mut request_builder = self
            .client
            .request(method.clone(), url)
            .header("Accept", "application/json");

        if !query.is_empty() {
            request_builder = request_builder.query(query);
        }

        if let Some(json_body) = body {
            request_builder = request_builder.json(json_body);
        }

        Ok(request_builder.send().await?)
    }

    fn check_status(&self, response: Response, url: &str) -> AppResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        Err(match status {
            StatusCode::NOT_FOUND => {
                AppError::NotFound(format!("{} has nothing at {}", self.provider_name, url))
            }
            StatusCode::TOO_MANY_REQUESTS => AppError::RateLimitError(format!(
                "{} API rate limit exceeded",
                self.provider_name
            )),
            _ => AppError::ApiError(format!(
                "{} API returned error: {}",
                self.provider_name, status
            )),
        })
    }

    async fn parse_response<T>(&self, response: Response) -> AppResult<T>
    where
        T: DeserializeOwned,
    {
        let response_text = response.text().await.map_err(|e| {
            AppError::SerializationError(format!(
                "Failed to read {} response: {}",
                self.provider_name, e
            ))
        })?;

        serde_json::from_str(&response_text).map_err(|e| {
            AppError::SerializationError(format!(
                "Failed to parse {} response: {}. Response: {}",
                self.provider_name,
                e,
                truncate_for_log(&response_text, 200)
            ))
        })
    }

    /// Check if a request can be made now (for testing/debugging)
    pub fn can_make_request_now(&self) -> bool {
        self.rate_limiter.check().is_ok()
    }

    pub fn provider_name(&self) -> &str {
        &self.provider_name
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

fn truncate_for_log(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        format!("{}...", text.chars().take(max_chars).collect::<String>())
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::provider::infrastructure::http_client::test_support::StubServer;
    use serde_json::json;

    fn test_client(timeout: Duration) -> RateLimitClient {
        RateLimitClient::new(
            "Test",
            RateLimitSettings::new(100.0, 10),
            timeout,
            "anistream-tests",
        )
        .unwrap()
    }

    #[test]
    fn test_client_creation() {
        let config = EngineConfig::default();
        let client = RateLimitClient::from_config("HiAnime", &config).unwrap();
        assert_eq!(client.provider_name(), "HiAnime");
        assert_eq!(client.timeout(), Duration::from_secs(12));

        let anilist = RateLimitClient::for_anilist(&config).unwrap();
        assert_eq!(anilist.provider_name(), "AniList");
    }

    #[test]
    fn test_can_make_request() {
        let client = RateLimitClient::from_config("Test", &EngineConfig::default()).unwrap();
        assert!(client.can_make_request_now());
    }

    #[test]
    fn test_invalid_settings_are_rejected() {
        let zero_rate = RateLimitClient::new(
            "Test",
            RateLimitSettings::new(0.0, 1),
            Duration::from_secs(1),
            "ua",
        );
        assert!(matches!(zero_rate, Err(AppError::ConfigError(_))));

        let zero_timeout = RateLimitClient::new(
            "Test",
            RateLimitSettings::new(1.0, 1),
            Duration::ZERO,
            "ua",
        );
        assert!(matches!(zero_timeout, Err(AppError::ConfigError(_))));
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate_for_log("ワンピース", 2), "ワン...");
        assert_eq!(truncate_for_log("short", 10), "short");
    }

    #[tokio::test]
    async fn test_get_parses_json() {
        let server = StubServer::start().await;
        server.route("/ok", 200, json!({"value": 7}).to_string());

        let client = test_client(Duration::from_secs(5));
        let value: Value = client.get(&server.url("/ok")).await.unwrap();
        assert_eq!(value["value"], 7);
    }

    #[tokio::test]
    async fn test_status_mapping() {
        let server = StubServer::start().await;
        server.route("/missing", 404, String::new());
        server.route("/busy", 429, String::new());
        server.route("/broken", 502, String::new());

        let client = test_client(Duration::from_secs(5));
        let missing = client.get::<Value>(&server.url("/missing")).await;
        let busy = client.get::<Value>(&server.url("/busy")).await;
        let broken = client.get::<Value>(&server.url("/broken")).await;

        assert!(matches!(missing, Err(AppError::NotFound(_))));
        assert!(matches!(busy, Err(AppError::RateLimitError(_))));
        assert!(matches!(broken, Err(AppError::ApiError(_))));
    }

    #[tokio::test]
    async fn test_malformed_body_is_serialization_error() {
        let server = StubServer::start().await;
        server.route("/html", 200, "<html>cloudflare</html>".to_string());

        let client = test_client(Duration::from_secs(5));
        let result = client.get::<Value>(&server.url("/html")).await;
        assert!(matches!(result, Err(AppError::SerializationError(_))));
    }

    #[tokio::test]
    async fn test_silent_upstream_times_out() {
        let server = StubServer::start().await;
        server.hang("/slow");

        let client = test_client(Duration::from_millis(300));
        let started = Instant::now();
        let result = client.get::<Value>(&server.url("/slow")).await;

        assert!(matches!(result, Err(AppError::Timeout(_))));
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_query_is_encoded() {
        let server = StubServer::start().await;
        server.route("/search", 200, "[]".to_string());

        let client = test_client(Duration::from_secs(5));
        let _: Value = client
            .get_with_query(&server.url("/search"), &[("q", "one piece".to_string())])
            .await
            .unwrap();

        let requests = server.requests();
        assert_eq!(requests.len(), 1);
        let target = &requests[0].target;
        assert!(target.contains("q=one+piece") || target.contains("q=one%20piece"));
    }
}
