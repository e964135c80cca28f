//! Anify `/episodes` payloads
//!
//! Depending on the deployment the route answers with either an object keyed
//! by subtype or a list of per-provider listings.

use crate::shared::utils::serde_helpers::{
    lenient_bool, lenient_opt_string, lenient_opt_u32, lenient_string, lenient_vec,
};
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnifyEpisode {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_opt_u32")]
    pub number: Option<u32>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub img: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub image: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub is_filler: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnifyProviderListing {
    #[serde(default, deserialize_with = "lenient_string")]
    pub provider_id: String,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub has_dub: bool,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub episodes: Vec<AnifyEpisode>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnifySubtypeListing {
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub provider_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub sub: Vec<AnifyEpisode>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub dub: Vec<AnifyEpisode>,
}

/// Either layout of the episodes route
#[derive(Debug, Clone)]
pub enum AnifyEpisodesPayload {
    BySubtype(AnifySubtypeListing),
    ByProvider(Vec<AnifyProviderListing>),
}

impl AnifyEpisodesPayload {
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Array(items) => Some(AnifyEpisodesPayload::ByProvider(
                items
                    .into_iter()
                    .filter_map(|item| serde_json::from_value(item).ok())
                    .collect(),
            )),
            Value::Object(_) => serde_json::from_value(value)
                .ok()
                .map(AnifyEpisodesPayload::BySubtype),
            _ => None,
        }
    }
}
