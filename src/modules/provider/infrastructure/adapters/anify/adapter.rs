//! Anify aggregator
//!
//! Queried straight by canonical id. Its source route needs the upstream
//! provider, watch id, episode number and canonical id together, so episode
//! ids handed out here carry all four:
//! `anify:{providerId}:{canonicalId}:{number}:{watchId}`.

use super::models::{AnifyEpisode, AnifyEpisodesPayload, AnifyProviderListing};
use crate::modules::provider::domain::entities::{
    EpisodeRecord, EpisodeTarget, EpisodesShape, ProviderEpisodeSet, VideoData,
};
use crate::modules::provider::domain::value_objects::{CanonicalAnimeId, StreamProvider, Subtype};
use crate::modules::provider::infrastructure::adapters::common::RawSourcesPayload;
use crate::modules::provider::infrastructure::http_client::{RateLimitClient, UpstreamResultExt};
use crate::modules::provider::traits::{
    ContentProviderClient, UniversalSourceClient, UniversalSourceQuery,
};
use crate::shared::config::EngineConfig;
use crate::shared::errors::AppResult;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;

const EPISODE_ID_PREFIX: &str = "anify";
/// Listing used when the subtype-keyed layout does not name its provider
const DEFAULT_PROVIDER_ID: &str = "zoro";

/// Anify's name for the site behind a stream provider
pub fn anify_provider_id(provider: StreamProvider) -> &'static str {
    match provider {
        StreamProvider::HiAnime => "zoro",
        StreamProvider::AnimePahe => "animepahe",
        // Consumet meta episode ids are gogoanime ids
        StreamProvider::Gogoanime | StreamProvider::Consumet => "gogoanime",
        StreamProvider::Anify => DEFAULT_PROVIDER_ID,
    }
}

/// Decoded form of an Anify episode id
#[derive(Debug, Clone, PartialEq)]
pub struct AnifyEpisodeRef {
    pub provider_id: String,
    pub canonical_id: String,
    pub number: u32,
    pub watch_id: String,
}

impl AnifyEpisodeRef {
    pub fn encode(&self) -> String {
        format!(
            "{}:{}:{}:{}:{}",
            EPISODE_ID_PREFIX, self.provider_id, self.canonical_id, self.number, self.watch_id
        )
    }

    /// The watch id is last so it may itself contain `:`
    pub fn decode(episode_id: &str) -> Option<Self> {
        let mut parts = episode_id.splitn(5, ':');
        if parts.next()? != EPISODE_ID_PREFIX {
            return None;
        }
        let provider_id = parts.next()?.to_string();
        let canonical_id = parts.next()?.to_string();
        let number = parts.next()?.parse().ok()?;
        let watch_id = parts.next()?.to_string();

        if provider_id.is_empty() || canonical_id.is_empty() || watch_id.is_empty() {
            return None;
        }
        Some(Self {
            provider_id,
            canonical_id,
            number,
            watch_id,
        })
    }
}

pub struct AnifyAdapter {
    http_client: RateLimitClient,
    base_url: String,
}

impl AnifyAdapter {
    pub fn new(config: &EngineConfig) -> AppResult<Self> {
        Ok(Self::with_client(
            RateLimitClient::from_config("Anify", config)?,
            &config.upstreams.anify,
        ))
    }

    pub fn with_client(http_client: RateLimitClient, base_url: &str) -> Self {
        Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn request_sources(&self, episode: &AnifyEpisodeRef, subtype: Subtype) -> Option<VideoData> {
        let url = format!("{}/sources", self.base_url);
        let query = [
            ("providerId", episode.provider_id.clone()),
            ("watchId", episode.watch_id.clone()),
            ("episodeNumber", episode.number.to_string()),
            ("id", episode.canonical_id.clone()),
            ("subType", subtype.to_string()),
        ];

        let payload: RawSourcesPayload = self
            .http_client
            .get_with_query(&url, &query)
            .await
            .or_log(
                "Anify",
                &format!(
                    "{} sources for {} episode {} via {}",
                    subtype, episode.canonical_id, episode.number, episode.provider_id
                ),
            )?;

        payload.into_video_data().into_playable()
    }
}

fn to_records(
    episodes: Vec<AnifyEpisode>,
    provider_id: &str,
    canonical_id: &CanonicalAnimeId,
) -> Vec<EpisodeRecord> {
    let mut records: Vec<EpisodeRecord> = episodes
        .into_iter()
        .filter_map(|episode| {
            let watch_id = episode.id.trim().to_string();
            let number = episode.number?;
            if watch_id.is_empty() {
                return None;
            }

            let reference = AnifyEpisodeRef {
                provider_id: provider_id.to_string(),
                canonical_id: canonical_id.to_string(),
                number,
                watch_id,
            };
            Some(EpisodeRecord {
                provider_episode_id: reference.encode(),
                number,
                title: episode.title,
                image: episode.img.or(episode.image),
                description: episode.description,
                is_filler: episode.is_filler.then_some(true),
            })
        })
        .collect();
    records.sort_by_key(|record| record.number);
    records.dedup_by_key(|record| record.number);
    records
}

/// First provider listing that actually has episodes, HiAnime's preferred
fn pick_listing(listings: Vec<AnifyProviderListing>) -> Option<AnifyProviderListing> {
    let mut usable: Vec<AnifyProviderListing> = listings
        .into_iter()
        .filter(|listing| !listing.provider_id.is_empty() && !listing.episodes.is_empty())
        .collect();
    let preferred = usable
        .iter()
        .position(|listing| listing.provider_id == DEFAULT_PROVIDER_ID)
        .unwrap_or(0);
    (!usable.is_empty()).then(|| usable.swap_remove(preferred))
}

#[async_trait]
impl ContentProviderClient for AnifyAdapter {
    fn provider(&self) -> StreamProvider {
        StreamProvider::Anify
    }

    async fn fetch_episodes(&self, target: &EpisodeTarget) -> Option<ProviderEpisodeSet> {
        let canonical_id = &target.canonical_id;
        let url = format!(
            "{}/episodes/{}",
            self.base_url,
            urlencoding::encode(canonical_id.as_str())
        );

        let value: Value = self
            .http_client
            .get(&url)
            .await
            .or_log("Anify", &format!("episodes for {}", canonical_id))?;

        let set = match AnifyEpisodesPayload::from_value(value)? {
            AnifyEpisodesPayload::BySubtype(listing) => {
                let provider_id = listing
                    .provider_id
                    .filter(|id| !id.trim().is_empty())
                    .unwrap_or_else(|| DEFAULT_PROVIDER_ID.to_string());
                let sub = to_records(listing.sub, &provider_id, canonical_id);
                let dub = to_records(listing.dub, &provider_id, canonical_id);
                let supports_dub = !dub.is_empty();

                let mut buckets = BTreeMap::new();
                buckets.insert(Subtype::Sub.to_string(), sub);
                buckets.insert(Subtype::Dub.to_string(), dub);
                ProviderEpisodeSet {
                    provider_id: StreamProvider::Anify,
                    supports_dub,
                    episodes: EpisodesShape::BySubtype(buckets).prune(),
                }
            }
            AnifyEpisodesPayload::ByProvider(listings) => {
                let listing = pick_listing(listings)?;
                let episodes = to_records(listing.episodes, &listing.provider_id, canonical_id);
                ProviderEpisodeSet::flat(StreamProvider::Anify, listing.has_dub, episodes)
            }
        };

        if set.is_empty() {
            log::debug!("Anify: No episodes for {}", canonical_id);
            return None;
        }
        Some(set)
    }

    async fn fetch_sources(&self, episode_id: &str, subtype: Subtype) -> Option<VideoData> {
        let Some(episode) = AnifyEpisodeRef::decode(episode_id) else {
            log::warn!("Anify: '{}' is not an Anify episode id", episode_id);
            return None;
        };
        self.request_sources(&episode, subtype).await
    }
}

#[async_trait]
impl UniversalSourceClient for AnifyAdapter {
    fn provider(&self) -> StreamProvider {
        StreamProvider::Anify
    }

    async fn fetch_sources_for(&self, query: &UniversalSourceQuery) -> Option<VideoData> {
        if let Some(episode) = AnifyEpisodeRef::decode(&query.watch_id) {
            return self.request_sources(&episode, query.subtype).await;
        }

        let episode = AnifyEpisodeRef {
            provider_id: anify_provider_id(query.provider).to_string(),
            canonical_id: query.canonical_id.to_string(),
            number: query.episode_number,
            watch_id: query.watch_id.clone(),
        };
        self.request_sources(&episode, query.subtype).await
    }
}
