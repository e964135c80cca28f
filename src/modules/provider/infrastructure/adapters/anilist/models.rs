//! AniList GraphQL models

use crate::shared::utils::serde_helpers::{lenient_opt_string, lenient_opt_u32};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MediaFormat {
    Tv,
    TvShort,
    Movie,
    Special,
    Ova,
    Ona,
    Music,
    #[serde(other)]
    Unknown,
}

impl MediaFormat {
    /// Label used by the streaming sites' search results
    pub fn search_label(&self) -> Option<&'static str> {
        match self {
            MediaFormat::Tv | MediaFormat::TvShort => Some("TV"),
            MediaFormat::Movie => Some("Movie"),
            MediaFormat::Special => Some("Special"),
            MediaFormat::Ova => Some("OVA"),
            MediaFormat::Ona => Some("ONA"),
            MediaFormat::Music => Some("Music"),
            MediaFormat::Unknown => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct MediaTitle {
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub romaji: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub english: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub user_preferred: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct FuzzyDate {
    #[serde(default, deserialize_with = "lenient_opt_u32")]
    pub year: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Media {
    pub id: Option<u32>,
    #[serde(default)]
    pub title: Option<MediaTitle>,
    #[serde(default)]
    pub format: Option<MediaFormat>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_u32")]
    pub season_year: Option<u32>,
    #[serde(default)]
    pub start_date: Option<FuzzyDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaResponse {
    #[serde(rename = "Media")]
    pub media: Option<Media>,
}
