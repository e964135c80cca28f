use super::models::{AniZipEpisode, AniZipMappings};
use crate::modules::provider::domain::entities::EpisodeMeta;
use crate::modules::provider::domain::value_objects::CanonicalAnimeId;
use crate::modules::provider::infrastructure::http_client::{RateLimitClient, UpstreamResultExt};
use crate::modules::provider::traits::EpisodeMetadataSource;
use crate::shared::config::EngineConfig;
use crate::shared::errors::AppResult;
use async_trait::async_trait;

/// Episode titles, thumbnails and synopses from ani.zip
pub struct AniZipAdapter {
    http_client: RateLimitClient,
    base_url: String,
}

impl AniZipAdapter {
    pub fn new(config: &EngineConfig) -> AppResult<Self> {
        Ok(Self::with_client(
            RateLimitClient::from_config("AniZip", config)?,
            &config.upstreams.anizip,
        ))
    }

    pub fn with_client(http_client: RateLimitClient, base_url: &str) -> Self {
        Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Regular episodes only, ordered by number
    pub fn map_episodes(mappings: AniZipMappings) -> Vec<EpisodeMeta> {
        let mut episodes: Vec<EpisodeMeta> = mappings
            .episodes
            .unwrap_or_default()
            .into_iter()
            .filter_map(|(key, value)| {
                // Specials are keyed `S1`, `S2`... and never line up with provider
                // numbering, whatever their `episodeNumber` says
                let number = key.parse::<u32>().ok().filter(|n| *n > 0)?;
                let episode: AniZipEpisode = serde_json::from_value(value).ok()?;

                Some(EpisodeMeta {
                    episode_number: number,
                    title: episode.preferred_title(),
                    image: episode.image.clone(),
                    summary: episode.summary.clone().or_else(|| episode.overview.clone()),
                })
            })
            .collect();

        episodes.sort_by_key(|episode| episode.episode_number);
        episodes.dedup_by_key(|episode| episode.episode_number);
        episodes
    }
}

#[async_trait]
impl EpisodeMetadataSource for AniZipAdapter {
    async fn fetch_episode_meta(&self, canonical_id: &CanonicalAnimeId) -> Vec<EpisodeMeta> {
        let url = format!("{}/mappings", self.base_url);
        let query = [("anilist_id", canonical_id.to_string())];

        let Some(mappings) = self
            .http_client
            .get_with_query::<AniZipMappings>(&url, &query)
            .await
            .or_log("AniZip", &format!("episode metadata for {}", canonical_id))
        else {
            return Vec::new();
        };

        let episodes = Self::map_episodes(mappings);
        log::debug!(
            "AniZip: {} episode metadata entries for {}",
            episodes.len(),
            canonical_id
        );
        episodes
    }
}
