use serde::{Deserialize, Serialize};

/// Catalog facts used to drive title search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimeInfo {
    pub title: String,
    pub english_title: Option<String>,
    pub year: Option<u32>,
    /// Catalog format, e.g. `TV`, `MOVIE`, `OVA`
    pub format: Option<String>,
}

/// One hit from a provider's free-text search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchCandidate {
    pub id: String,
    pub title: String,
    pub format: Option<String>,
    pub year: Option<u32>,
}

/// Per-episode metadata from the episode metadata service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EpisodeMeta {
    pub episode_number: u32,
    pub title: Option<String>,
    pub image: Option<String>,
    pub summary: Option<String>,
}
