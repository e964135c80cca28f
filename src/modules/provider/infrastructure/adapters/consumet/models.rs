//! Consumet payloads, shared by the gogoanime, animepahe and AniList meta routes

use crate::modules::provider::domain::entities::{EpisodeRecord, SearchCandidate};
use crate::shared::utils::serde_helpers::{
    lenient_bool, lenient_opt_string, lenient_opt_u32, lenient_string, lenient_vec,
    value_to_string,
};
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use std::sync::OnceLock;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsumetEpisode {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_opt_u32")]
    pub number: Option<u32>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub image: Option<String>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub is_filler: bool,
}

impl ConsumetEpisode {
    /// Episodes without an id are unusable; a missing number is recovered
    /// from ids like `one-piece-episode-12`
    pub fn into_record(self) -> Option<EpisodeRecord> {
        let id = self.id.trim().to_string();
        if id.is_empty() {
            return None;
        }
        let number = self.number.or_else(|| episode_number_from_id(&id))?;

        Some(EpisodeRecord {
            provider_episode_id: id,
            number,
            title: self.title,
            image: self.image,
            description: self.description,
            is_filler: self.is_filler.then_some(true),
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsumetInfo {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: String,
    /// Plain string on gogoanime, `{romaji, english}` on the meta routes
    #[serde(default)]
    pub title: Option<Value>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub sub_or_dub: Option<String>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub episodes: Vec<ConsumetEpisode>,
}

impl ConsumetInfo {
    pub fn into_records(self) -> Vec<EpisodeRecord> {
        records_from(self.episodes)
    }
}

/// Ordered, de-duplicated episode records
pub fn records_from(episodes: Vec<ConsumetEpisode>) -> Vec<EpisodeRecord> {
    let mut records: Vec<EpisodeRecord> = episodes
        .into_iter()
        .filter_map(ConsumetEpisode::into_record)
        .collect();
    records.sort_by_key(|record| record.number);
    records.dedup_by_key(|record| record.number);
    records
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsumetSearchResult {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(default)]
    pub title: Option<Value>,
    #[serde(default, rename = "type", deserialize_with = "lenient_opt_string")]
    pub media_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_u32")]
    pub release_date: Option<u32>,
}

impl ConsumetSearchResult {
    pub fn into_candidate(self) -> Option<SearchCandidate> {
        let title = title_text(self.title.as_ref())?;
        if self.id.trim().is_empty() {
            return None;
        }
        Some(SearchCandidate {
            id: self.id,
            title,
            format: self.media_type,
            year: self.release_date,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConsumetSearchResponse {
    #[serde(default, deserialize_with = "lenient_vec")]
    pub results: Vec<ConsumetSearchResult>,
}

/// Title text from either a plain string or a `{romaji, english, ...}` object
pub fn title_text(title: Option<&Value>) -> Option<String> {
    let text = match title? {
        Value::Object(map) => ["romaji", "english", "userPreferred", "native"]
            .iter()
            .filter_map(|key| map.get(*key))
            .find_map(value_to_string),
        other => value_to_string(other),
    }?;
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

pub fn episode_number_from_id(id: &str) -> Option<u32> {
    static EPISODE_NUMBER: OnceLock<Regex> = OnceLock::new();
    let pattern = EPISODE_NUMBER.get_or_init(|| {
        Regex::new(r"(?i)episode-(\d+)$").expect("episode number pattern is valid")
    });

    pattern
        .captures(id)
        .and_then(|captures| captures.get(1))
        .and_then(|number| number.as_str().parse().ok())
}
