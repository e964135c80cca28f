//! Consumet AniList meta routes
//!
//! Addressed directly by canonical id, so no slug lookup is needed. Sub and
//! dub listings are separate requests with different episode ids.

use super::models::{records_from, ConsumetEpisode};
use crate::modules::provider::domain::entities::{
    EpisodeRecord, EpisodeTarget, EpisodesShape, ProviderEpisodeSet, VideoData,
};
use crate::modules::provider::domain::value_objects::{StreamProvider, Subtype};
use crate::modules::provider::infrastructure::adapters::common::RawSourcesPayload;
use crate::modules::provider::infrastructure::http_client::{RateLimitClient, UpstreamResultExt};
use crate::modules::provider::traits::ContentProviderClient;
use crate::shared::config::EngineConfig;
use crate::shared::errors::AppResult;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;

pub struct ConsumetMetaAdapter {
    http_client: RateLimitClient,
    base_url: String,
}

impl ConsumetMetaAdapter {
    pub fn new(config: &EngineConfig) -> AppResult<Self> {
        Ok(Self::with_client(
            RateLimitClient::from_config("Consumet", config)?,
            &config.upstreams.consumet,
        ))
    }

    pub fn with_client(http_client: RateLimitClient, base_url: &str) -> Self {
        Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn fetch_listing(&self, target: &EpisodeTarget, subtype: Subtype) -> Vec<EpisodeRecord> {
        let url = format!(
            "{}/meta/anilist/episodes/{}",
            self.base_url,
            urlencoding::encode(target.canonical_id.as_str())
        );
        let query = [("dub", (subtype == Subtype::Dub).to_string())];

        self.http_client
            .get_with_query::<Value>(&url, &query)
            .await
            .or_log(
                "Consumet",
                &format!("{} episodes for {}", subtype, target.canonical_id),
            )
            .map(|value| records_from(episodes_from_value(value)))
            .unwrap_or_default()
    }
}

/// The episodes route answers with a bare array; the info route nests it
fn episodes_from_value(value: Value) -> Vec<ConsumetEpisode> {
    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("episodes") {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    };

    items
        .into_iter()
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect()
}

#[async_trait]
impl ContentProviderClient for ConsumetMetaAdapter {
    fn provider(&self) -> StreamProvider {
        StreamProvider::Consumet
    }

    async fn fetch_episodes(&self, target: &EpisodeTarget) -> Option<ProviderEpisodeSet> {
        let (sub, dub) = tokio::join!(
            self.fetch_listing(target, Subtype::Sub),
            self.fetch_listing(target, Subtype::Dub)
        );

        if sub.is_empty() && dub.is_empty() {
            log::debug!("Consumet: No episodes for {}", target.canonical_id);
            return None;
        }

        let supports_dub = !dub.is_empty();
        let episodes = if supports_dub {
            let mut buckets = BTreeMap::new();
            buckets.insert(Subtype::Sub.to_string(), sub);
            buckets.insert(Subtype::Dub.to_string(), dub);
            EpisodesShape::BySubtype(buckets).prune()
        } else {
            EpisodesShape::Flat(sub)
        };

        Some(ProviderEpisodeSet {
            provider_id: StreamProvider::Consumet,
            supports_dub,
            episodes,
        })
    }

    async fn fetch_sources(&self, episode_id: &str, subtype: Subtype) -> Option<VideoData> {
        let url = format!(
            "{}/meta/anilist/watch/{}",
            self.base_url,
            urlencoding::encode(episode_id)
        );

        let payload: RawSourcesPayload = self
            .http_client
            .get(&url)
            .await
            .or_log("Consumet", &format!("{} sources for {}", subtype, episode_id))?;

        payload.into_video_data().into_playable()
    }
}
