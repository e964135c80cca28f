use super::models::ArmIdsResponse;
use crate::modules::provider::domain::value_objects::CanonicalAnimeId;
use crate::modules::provider::infrastructure::http_client::{RateLimitClient, UpstreamResultExt};
use crate::modules::provider::traits::AlternateIdLookup;
use crate::shared::config::EngineConfig;
use crate::shared::errors::AppResult;
use async_trait::async_trait;

/// ARM cross-catalog id mapper (AniList -> MyAnimeList)
pub struct ArmAdapter {
    http_client: RateLimitClient,
    base_url: String,
}

impl ArmAdapter {
    pub fn new(config: &EngineConfig) -> AppResult<Self> {
        Ok(Self::with_client(
            RateLimitClient::from_config("ARM", config)?,
            &config.upstreams.arm,
        ))
    }

    pub fn with_client(http_client: RateLimitClient, base_url: &str) -> Self {
        Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl AlternateIdLookup for ArmAdapter {
    async fn alternate_id(&self, canonical_id: &CanonicalAnimeId) -> Option<String> {
        let url = format!("{}/api/v2/ids", self.base_url);
        let query = [
            ("source", "anilist".to_string()),
            ("id", canonical_id.to_string()),
        ];

        let response: ArmIdsResponse = self
            .http_client
            .get_with_query(&url, &query)
            .await
            .or_log("ARM", &format!("id mapping for {}", canonical_id))?;

        let mal_id = response.myanimelist;
        if mal_id.is_none() {
            log::debug!("ARM: No MyAnimeList id known for {}", canonical_id);
        }
        mal_id
    }
}
