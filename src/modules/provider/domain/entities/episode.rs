use crate::modules::provider::domain::value_objects::{CanonicalAnimeId, StreamProvider};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One episode as listed by a content provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EpisodeRecord {
    /// Provider-specific id, passed back verbatim when fetching sources
    pub provider_episode_id: String,
    pub number: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_filler: Option<bool>,
}

impl EpisodeRecord {
    pub fn new(provider_episode_id: impl Into<String>, number: u32) -> Self {
        Self {
            provider_episode_id: provider_episode_id.into(),
            number,
            title: None,
            image: None,
            description: None,
            is_filler: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

/// Episode listing layout
///
/// Most providers return one flat list; Anify splits it per subtype. The
/// untagged representation keeps both lossless in JSON: an array or an object
/// keyed by `sub`/`dub`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EpisodesShape {
    Flat(Vec<EpisodeRecord>),
    BySubtype(BTreeMap<String, Vec<EpisodeRecord>>),
}

impl EpisodesShape {
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total episodes across every subtype bucket
    pub fn len(&self) -> usize {
        match self {
            EpisodesShape::Flat(episodes) => episodes.len(),
            EpisodesShape::BySubtype(buckets) => buckets.values().map(Vec::len).sum(),
        }
    }

    pub fn iter(&self) -> Box<dyn Iterator<Item = &EpisodeRecord> + '_> {
        match self {
            EpisodesShape::Flat(episodes) => Box::new(episodes.iter()),
            EpisodesShape::BySubtype(buckets) => Box::new(buckets.values().flatten()),
        }
    }

    pub fn iter_mut(&mut self) -> Box<dyn Iterator<Item = &mut EpisodeRecord> + '_> {
        match self {
            EpisodesShape::Flat(episodes) => Box::new(episodes.iter_mut()),
            EpisodesShape::BySubtype(buckets) => Box::new(buckets.values_mut().flatten()),
        }
    }

    /// Drop empty subtype buckets so an all-empty map reads as empty
    pub fn prune(mut self) -> Self {
        if let EpisodesShape::BySubtype(buckets) = &mut self {
            buckets.retain(|_, episodes| !episodes.is_empty());
        }
        self
    }
}

impl Default for EpisodesShape {
    fn default() -> Self {
        EpisodesShape::Flat(Vec::new())
    }
}

/// Everything one provider knows about an anime's episodes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderEpisodeSet {
    pub provider_id: StreamProvider,
    pub supports_dub: bool,
    pub episodes: EpisodesShape,
}

impl ProviderEpisodeSet {
    pub fn flat(provider_id: StreamProvider, supports_dub: bool, episodes: Vec<EpisodeRecord>) -> Self {
        Self {
            provider_id,
            supports_dub,
            episodes: EpisodesShape::Flat(episodes),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.episodes.is_empty()
    }

    pub fn episode_count(&self) -> usize {
        self.episodes.len()
    }
}

/// Input to a provider's episode listing
///
/// Slug-mapped providers need `slug`; direct providers only look at the
/// canonical id.
#[derive(Debug, Clone, PartialEq)]
pub struct EpisodeTarget {
    pub canonical_id: CanonicalAnimeId,
    pub slug: Option<String>,
    pub title: Option<String>,
}

impl EpisodeTarget {
    pub fn direct(canonical_id: CanonicalAnimeId) -> Self {
        Self {
            canonical_id,
            slug: None,
            title: None,
        }
    }

    pub fn with_slug(canonical_id: CanonicalAnimeId, slug: impl Into<String>) -> Self {
        Self {
            canonical_id,
            slug: Some(slug.into()),
            title: None,
        }
    }

    /// Slug if present and non-blank
    pub fn slug(&self) -> Option<&str> {
        self.slug.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }
}
