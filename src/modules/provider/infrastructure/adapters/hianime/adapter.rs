use super::models::{
    HiAnimeAboutResponse, HiAnimeEpisode, HiAnimeEpisodesResponse, HiAnimeSourcesResponse,
};
use crate::modules::provider::domain::entities::{
    EpisodeRecord, EpisodeTarget, ProviderEpisodeSet, VideoData,
};
use crate::modules::provider::domain::value_objects::{StreamProvider, Subtype};
use crate::modules::provider::infrastructure::http_client::{RateLimitClient, UpstreamResultExt};
use crate::modules::provider::traits::ContentProviderClient;
use crate::shared::config::EngineConfig;
use crate::shared::errors::AppResult;
use async_trait::async_trait;

/// Streaming server asked for; `hd-1` is the one that serves both categories
const DEFAULT_SERVER: &str = "hd-1";

pub struct HiAnimeAdapter {
    http_client: RateLimitClient,
    base_url: String,
}

impl HiAnimeAdapter {
    pub fn new(config: &EngineConfig) -> AppResult<Self> {
        Ok(Self::with_client(
            RateLimitClient::from_config("HiAnime", config)?,
            &config.upstreams.hianime,
        ))
    }

    pub fn with_client(http_client: RateLimitClient, base_url: &str) -> Self {
        Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn episode_list(&self, slug: &str) -> Option<HiAnimeEpisodesResponse> {
        let url = format!(
            "{}/api/v2/hianime/anime/{}/episodes",
            self.base_url,
            urlencoding::encode(slug)
        );
        self.http_client
            .get(&url)
            .await
            .or_log("HiAnime", &format!("episodes for {}", slug))
    }

    /// Whether any dubbed episode exists; unknown counts as no
    async fn has_dub(&self, slug: &str) -> bool {
        let url = format!(
            "{}/api/v2/hianime/anime/{}",
            self.base_url,
            urlencoding::encode(slug)
        );
        let response: Option<HiAnimeAboutResponse> = self
            .http_client
            .get(&url)
            .await
            .or_log("HiAnime", &format!("info for {}", slug));

        response
            .and_then(HiAnimeAboutResponse::into_data)
            .and_then(|about| about.dub_count())
            .is_some_and(|dub| dub > 0)
    }
}

#[async_trait]
impl ContentProviderClient for HiAnimeAdapter {
    fn provider(&self) -> StreamProvider {
        StreamProvider::HiAnime
    }

    /// Source lookups need `{slug}?ep={n}`, not a bare slug
    fn requires_composite_id(&self) -> bool {
        true
    }

    async fn fetch_episodes(&self, target: &EpisodeTarget) -> Option<ProviderEpisodeSet> {
        let slug = target.slug()?;
        let (response, supports_dub) = tokio::join!(self.episode_list(slug), self.has_dub(slug));

        let list = response?.into_data()?;
        let mut episodes: Vec<EpisodeRecord> = list
            .episodes
            .into_iter()
            .filter_map(HiAnimeEpisode::into_record)
            .collect();
        episodes.sort_by_key(|record| record.number);
        episodes.dedup_by_key(|record| record.number);

        if episodes.is_empty() {
            return None;
        }

        if let Some(total) = list.total_episodes {
            if total as usize != episodes.len() {
                log::debug!(
                    "HiAnime: {} lists {} of {} episodes",
                    slug,
                    episodes.len(),
                    total
                );
            }
        }

        Some(ProviderEpisodeSet::flat(
            StreamProvider::HiAnime,
            supports_dub,
            episodes,
        ))
    }

    async fn fetch_sources(&self, episode_id: &str, subtype: Subtype) -> Option<VideoData> {
        if !episode_id.contains("?ep=") {
            log::warn!(
                "HiAnime: '{}' is not a composite episode id, sources will likely be empty",
                episode_id
            );
        }

        let url = format!("{}/api/v2/hianime/episode/sources", self.base_url);
        let query = [
            ("animeEpisodeId", episode_id.to_string()),
            ("server", DEFAULT_SERVER.to_string()),
            ("category", subtype.to_string()),
        ];

        let response: HiAnimeSourcesResponse = self
            .http_client
            .get_with_query(&url, &query)
            .await
            .or_log("HiAnime", &format!("{} sources for {}", subtype, episode_id))?;

        response.into_data()?.into_video_data().into_playable()
    }
}
