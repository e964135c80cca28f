//! Seams between the resolution engine and the upstream clients
//!
//! Every method here swallows upstream failure: a transport error, timeout,
//! non-2xx answer or malformed payload comes back as `None` (or an empty
//! list) and is logged by the implementation. Only the orchestrator decides
//! what "nothing" means.

use crate::modules::provider::domain::entities::{
    AnimeInfo, EpisodeMeta, EpisodeTarget, ProviderEpisodeSet, SearchCandidate, SiteSlugs,
    VideoData,
};
use crate::modules::provider::domain::value_objects::{CanonicalAnimeId, StreamProvider, Subtype};
use async_trait::async_trait;
use std::fmt;

/// A content provider that lists episodes and serves video sources
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContentProviderClient: Send + Sync {
    fn provider(&self) -> StreamProvider;

    /// Whether episode ids must be `{slug}?ep={n}` before fetching sources
    fn requires_composite_id(&self) -> bool {
        false
    }

    async fn fetch_episodes(&self, target: &EpisodeTarget) -> Option<ProviderEpisodeSet>;

    async fn fetch_sources(&self, episode_id: &str, subtype: Subtype) -> Option<VideoData>;
}

/// Query for a provider that can serve sources on behalf of other providers
#[derive(Debug, Clone, PartialEq)]
pub struct UniversalSourceQuery {
    pub provider: StreamProvider,
    pub watch_id: String,
    pub episode_number: u32,
    pub canonical_id: CanonicalAnimeId,
    pub subtype: Subtype,
}

/// Secondary source of video links, tried once when the named provider has none
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UniversalSourceClient: Send + Sync {
    fn provider(&self) -> StreamProvider;

    async fn fetch_sources_for(&self, query: &UniversalSourceQuery) -> Option<VideoData>;
}

/// Provider whose catalog can only be reached through free-text search
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SearchableProvider: Send + Sync {
    fn provider(&self) -> StreamProvider;

    async fn search(&self, query: &str) -> Vec<SearchCandidate>;
}

/// Key for the slug lookup
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LookupId {
    Canonical(CanonicalAnimeId),
    /// Id in the alternate catalog (MyAnimeList)
    Alternate(String),
}

impl fmt::Display for LookupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupId::Canonical(id) => write!(f, "{}", id),
            LookupId::Alternate(id) => write!(f, "mal:{}", id),
        }
    }
}

/// Identifier lookup A: canonical or alternate id to per-provider slugs
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentifierLookup: Send + Sync {
    async fn lookup_slugs(&self, id: &LookupId) -> Option<SiteSlugs>;
}

/// Identifier lookup B: canonical id to alternate catalog id
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AlternateIdLookup: Send + Sync {
    async fn alternate_id(&self, canonical_id: &CanonicalAnimeId) -> Option<String>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EpisodeMetadataSource: Send + Sync {
    async fn fetch_episode_meta(&self, canonical_id: &CanonicalAnimeId) -> Vec<EpisodeMeta>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AnimeCatalog: Send + Sync {
    async fn anime_info(&self, canonical_id: &CanonicalAnimeId) -> Option<AnimeInfo>;
}
