use crate::modules::provider::domain::value_objects::{CanonicalAnimeId, StreamProvider};
use crate::shared::infrastructure::cache::Cacheable;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// How a provider identifier was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolvedVia {
    /// Lookup A answered for the canonical id
    Direct,
    /// Lookup A only answered for the alternate catalog id from lookup B
    FallbackChain,
}

/// A provider's own handle for an anime
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderIdentifier {
    pub provider: StreamProvider,
    pub anilist_id: CanonicalAnimeId,
    pub slug: String,
    pub resolved_via: ResolvedVia,
}

/// Per-provider slugs reported by the identifier lookup
///
/// Keyed by the provider's wire name so the map can be memoized as plain JSON.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SiteSlugs(BTreeMap<String, String>);

impl SiteSlugs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Blank slugs are ignored; the first slug for a provider wins
    pub fn insert(&mut self, provider: StreamProvider, slug: &str) {
        let slug = slug.trim();
        if slug.is_empty() {
            return;
        }
        self.0
            .entry(provider.as_str().to_string())
            .or_insert_with(|| slug.to_string());
    }

    pub fn slug_for(&self, provider: StreamProvider) -> Option<&str> {
        self.0
            .get(provider.as_str())
            .map(String::as_str)
            .filter(|s| !s.is_empty())
    }

    /// Providers with a slug, skipping names this build does not know
    pub fn providers(&self) -> Vec<StreamProvider> {
        self.0
            .keys()
            .filter_map(|name| name.parse::<StreamProvider>().ok())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl Cacheable for SiteSlugs {
    fn is_cacheable(&self) -> bool {
        !self.is_empty()
    }
}
