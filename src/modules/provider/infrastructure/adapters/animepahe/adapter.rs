//! AnimePahe through Consumet
//!
//! AnimePahe ids are opaque session hashes that no mapping service knows,
//! so the show is found by title search and the best hit is picked by the
//! title matcher. Its watch route mixes sub and dub links in one list.

use crate::modules::provider::domain::entities::{
    EpisodeTarget, ProviderEpisodeSet, SearchCandidate, VideoData,
};
use crate::modules::provider::domain::value_objects::{StreamProvider, Subtype};
use crate::modules::provider::infrastructure::adapters::common::RawSourcesPayload;
use crate::modules::provider::infrastructure::adapters::consumet::models::{
    ConsumetInfo, ConsumetSearchResponse, ConsumetSearchResult,
};
use crate::modules::provider::infrastructure::http_client::{RateLimitClient, UpstreamResultExt};
use crate::modules::provider::traits::{ContentProviderClient, SearchableProvider};
use crate::shared::config::EngineConfig;
use crate::shared::errors::AppResult;
use async_trait::async_trait;

pub struct AnimePaheAdapter {
    http_client: RateLimitClient,
    base_url: String,
}

impl AnimePaheAdapter {
    pub fn new(config: &EngineConfig) -> AppResult<Self> {
        Ok(Self::with_client(
            RateLimitClient::from_config("AnimePahe", config)?,
            &config.upstreams.consumet,
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
impl SearchableProvider for AnimePaheAdapter {
    fn provider(&self) -> StreamProvider {
        StreamProvider::AnimePahe
    }

    async fn search(&self, query: &str) -> Vec<SearchCandidate> {
        let query = query.trim();
        if query.is_empty() {
            return Vec::new();
        }

        let url = format!(
            "{}/anime/animepahe/{}",
            self.base_url,
            urlencoding::encode(query)
        );
        let Some(response) = self
            .http_client
            .get::<ConsumetSearchResponse>(&url)
            .await
            .or_log("AnimePahe", &format!("search for '{}'", query))
        else {
            return Vec::new();
        };

        let candidates: Vec<SearchCandidate> = response
            .results
            .into_iter()
            .filter_map(ConsumetSearchResult::into_candidate)
            .collect();
        log::debug!(
            "AnimePahe: {} candidates for '{}'",
            candidates.len(),
            query
        );
        candidates
    }
}

#[async_trait]
impl ContentProviderClient for AnimePaheAdapter {
    fn provider(&self) -> StreamProvider {
        StreamProvider::AnimePahe
    }

    async fn fetch_episodes(&self, target: &EpisodeTarget) -> Option<ProviderEpisodeSet> {
        let anime_id = target.slug()?;
        let url = format!(
            "{}/anime/animepahe/info/{}",
            self.base_url,
            urlencoding::encode(anime_id)
        );

        let info: ConsumetInfo = self
            .http_client
            .get(&url)
            .await
            .or_log("AnimePahe", &format!("info for {}", anime_id))?;

        let episodes = info.into_records();
        if episodes.is_empty() {
            return None;
        }

        // Dub availability is only visible per episode on the watch route
        Some(ProviderEpisodeSet::flat(
            StreamProvider::AnimePahe,
            false,
            episodes,
        ))
    }

    async fn fetch_sources(&self, episode_id: &str, subtype: Subtype) -> Option<VideoData> {
        let url = format!("{}/anime/animepahe/watch", self.base_url);
        let query = [("episodeId", episode_id.to_string())];

        let mut payload: RawSourcesPayload = self
            .http_client
            .get_with_query(&url, &query)
            .await
            .or_log("AnimePahe", &format!("sources for {}", episode_id))?;

        payload.retain_subtype(subtype);
        payload.into_video_data().into_playable()
    }
}
