//! HiAnime (aniwatch-api) payloads

use crate::modules::provider::domain::entities::EpisodeRecord;
use crate::modules::provider::infrastructure::adapters::common::RawSourcesPayload;
use crate::shared::utils::serde_helpers::{
    lenient_bool, lenient_opt_string, lenient_opt_u32, lenient_string, lenient_vec,
};
use serde::Deserialize;

/// Every route wraps its payload as `{success, data}`
#[derive(Debug, Clone, Deserialize)]
pub struct HiAnimeEnvelope<T> {
    #[serde(default, deserialize_with = "lenient_bool")]
    pub success: bool,
    #[serde(default)]
    pub data: Option<T>,
}

impl<T> HiAnimeEnvelope<T> {
    /// Payload of a successful response; a `success: false` body is empty
    pub fn into_data(self) -> Option<T> {
        if self.success {
            self.data
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HiAnimeEpisodeList {
    #[serde(default, deserialize_with = "lenient_opt_u32")]
    pub total_episodes: Option<u32>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub episodes: Vec<HiAnimeEpisode>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HiAnimeEpisode {
    /// Already composite, e.g. `one-piece-100?ep=2142`
    #[serde(default, deserialize_with = "lenient_string")]
    pub episode_id: String,
    #[serde(default, deserialize_with = "lenient_opt_u32")]
    pub number: Option<u32>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub is_filler: bool,
}

impl HiAnimeEpisode {
    pub fn into_record(self) -> Option<EpisodeRecord> {
        let id = self.episode_id.trim();
        if id.is_empty() {
            return None;
        }

        Some(EpisodeRecord {
            provider_episode_id: id.to_string(),
            number: self.number?,
            title: self.title.filter(|t| !t.trim().is_empty()),
            image: None,
            description: None,
            is_filler: Some(self.is_filler),
        })
    }
}

/// `/anime/{id}` payload, read only for its per-category episode counts
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HiAnimeAboutPayload {
    #[serde(default)]
    pub anime: Option<HiAnimeAbout>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HiAnimeAbout {
    #[serde(default)]
    pub info: Option<HiAnimeAboutInfo>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HiAnimeAboutInfo {
    #[serde(default)]
    pub stats: Option<HiAnimeStats>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HiAnimeStats {
    #[serde(default)]
    pub episodes: Option<HiAnimeCategoryCounts>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HiAnimeCategoryCounts {
    #[serde(default, deserialize_with = "lenient_opt_u32")]
    pub sub: Option<u32>,
    #[serde(default, deserialize_with = "lenient_opt_u32")]
    pub dub: Option<u32>,
}

impl HiAnimeAboutPayload {
    pub fn dub_count(&self) -> Option<u32> {
        self.anime
            .as_ref()?
            .info
            .as_ref()?
            .stats
            .as_ref()?
            .episodes
            .as_ref()?
            .dub
    }
}

pub type HiAnimeSourcesResponse = HiAnimeEnvelope<RawSourcesPayload>;
pub type HiAnimeAboutResponse = HiAnimeEnvelope<HiAnimeAboutPayload>;
pub type HiAnimeEpisodesResponse = HiAnimeEnvelope<HiAnimeEpisodeList>;
