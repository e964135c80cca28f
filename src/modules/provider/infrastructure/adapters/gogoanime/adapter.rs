//! Gogoanime through Consumet
//!
//! Sub and dub are separate catalog entries: the dub listing lives under
//! `{slug}-dub` and its episode ids read `{slug}-dub-episode-{n}`.

use crate::modules::provider::domain::entities::{EpisodeTarget, ProviderEpisodeSet, VideoData};
use crate::modules::provider::domain::value_objects::{StreamProvider, Subtype};
use crate::modules::provider::infrastructure::adapters::common::RawSourcesPayload;
use crate::modules::provider::infrastructure::adapters::consumet::models::ConsumetInfo;
use crate::modules::provider::infrastructure::http_client::{RateLimitClient, UpstreamResultExt};
use crate::modules::provider::traits::ContentProviderClient;
use crate::shared::config::EngineConfig;
use crate::shared::errors::AppResult;
use async_trait::async_trait;

pub struct GogoanimeAdapter {
    http_client: RateLimitClient,
    base_url: String,
}

impl GogoanimeAdapter {
    pub fn new(config: &EngineConfig) -> AppResult<Self> {
        Ok(Self::with_client(
            RateLimitClient::from_config("Gogoanime", config)?,
            &config.upstreams.consumet,
        ))
    }

    pub fn with_client(http_client: RateLimitClient, base_url: &str) -> Self {
        Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn fetch_info(&self, slug: &str) -> Option<ConsumetInfo> {
        let url = format!(
            "{}/anime/gogoanime/info/{}",
            self.base_url,
            urlencoding::encode(slug)
        );
        self.http_client
            .get(&url)
            .await
            .or_log("Gogoanime", &format!("info for {}", slug))
    }
}

/// `{slug}-dub` listing for a sub slug; dub slugs are returned as-is
pub fn dub_slug(slug: &str) -> String {
    if slug.ends_with("-dub") {
        slug.to_string()
    } else {
        format!("{}-dub", slug)
    }
}

/// Episode id of the dub counterpart, e.g. `one-piece-episode-1` ->
/// `one-piece-dub-episode-1`
pub fn dub_episode_id(episode_id: &str) -> String {
    if episode_id.contains("-dub-episode-") {
        return episode_id.to_string();
    }
    match episode_id.rfind("-episode-") {
        Some(index) => format!("{}-dub{}", &episode_id[..index], &episode_id[index..]),
        None => episode_id.to_string(),
    }
}

#[async_trait]
impl ContentProviderClient for GogoanimeAdapter {
    fn provider(&self) -> StreamProvider {
        StreamProvider::Gogoanime
    }

    async fn fetch_episodes(&self, target: &EpisodeTarget) -> Option<ProviderEpisodeSet> {
        let Some(slug) = target.slug() else {
            log::debug!("Gogoanime: No slug for {}", target.canonical_id);
            return None;
        };
        let dub = dub_slug(slug);

        let (sub_info, dub_info) = tokio::join!(self.fetch_info(slug), self.fetch_info(&dub));

        let episodes = sub_info.map(ConsumetInfo::into_records).unwrap_or_default();
        if episodes.is_empty() {
            log::debug!("Gogoanime: Empty listing for {}", slug);
            return None;
        }

        let supports_dub = dub_info
            .map(|info| !info.episodes.is_empty())
            .unwrap_or(false);

        log::debug!(
            "Gogoanime: {} episodes for {} (dub: {})",
            episodes.len(),
            slug,
            supports_dub
        );
        Some(ProviderEpisodeSet::flat(
            StreamProvider::Gogoanime,
            supports_dub,
            episodes,
        ))
    }

    async fn fetch_sources(&self, episode_id: &str, subtype: Subtype) -> Option<VideoData> {
        let watch_id = match subtype {
            Subtype::Sub => episode_id.to_string(),
            Subtype::Dub => dub_episode_id(episode_id),
        };
        let url = format!(
            "{}/anime/gogoanime/watch/{}",
            self.base_url,
            urlencoding::encode(&watch_id)
        );

        let payload: RawSourcesPayload = self
            .http_client
            .get(&url)
            .await
            .or_log("Gogoanime", &format!("sources for {}", watch_id))?;

        payload.into_video_data().into_playable()
    }
}
