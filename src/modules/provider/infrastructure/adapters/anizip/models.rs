//! ani.zip `/mappings` payload

use crate::shared::utils::serde_helpers::{lenient_opt_string, lenient_opt_u32};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AniZipMappings {
    /// Keyed by episode number as a string; specials use keys like `S1`
    #[serde(default)]
    pub episodes: Option<BTreeMap<String, Value>>,
    #[serde(default, deserialize_with = "lenient_opt_u32")]
    pub episode_count: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AniZipEpisode {
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub episode: Option<String>,
    /// Language code -> title (`en`, `ja`, `x-jat`)
    #[serde(default)]
    pub title: Option<BTreeMap<String, Value>>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub image: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub summary: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub overview: Option<String>,
}

impl AniZipEpisode {
    /// English title, else the romanized one
    pub fn preferred_title(&self) -> Option<String> {
        let titles = self.title.as_ref()?;
        ["en", "x-jat"]
            .iter()
            .filter_map(|lang| titles.get(*lang))
            .filter_map(|value| value.as_str())
            .map(str::trim)
            .find(|title| !title.is_empty())
            .map(str::to_string)
    }
}
