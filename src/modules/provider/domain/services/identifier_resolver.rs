//! Canonical id to provider identifier resolution
//!
//! Lookup A (site slugs) is asked for the canonical id first. When it has
//! nothing for the provider, lookup B translates the canonical id into the
//! alternate catalog and lookup A is asked again with that id. Each lookup
//! answer is memoized on its own key, so a broken lookup B never slows down
//! anime that lookup A already knows.

use crate::modules::provider::domain::entities::{ProviderIdentifier, ResolvedVia, SiteSlugs};
use crate::modules::provider::domain::value_objects::{CanonicalAnimeId, StreamProvider};
use crate::modules::provider::traits::{AlternateIdLookup, IdentifierLookup, LookupId};
use crate::shared::infrastructure::cache::CacheLayer;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

const COMPOSITE_MARKER: &str = "?ep=";

/// How an episode id came out of [`IdentifierResolver::resolve_episode_id`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    /// The caller already passed `{slug}?ep={n}`
    AlreadyComposite,
    Direct,
    FallbackChain,
    /// Nothing mapped; the raw id is passed through and will likely fail
    Unresolved,
}

impl From<ResolvedVia> for Resolution {
    fn from(via: ResolvedVia) -> Self {
        match via {
            ResolvedVia::Direct => Resolution::Direct,
            ResolvedVia::FallbackChain => Resolution::FallbackChain,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedEpisodeId {
    pub value: String,
    pub resolution: Resolution,
}

impl ResolvedEpisodeId {
    pub fn is_resolved(&self) -> bool {
        self.resolution != Resolution::Unresolved
    }
}

pub fn is_composite_episode_id(episode_id: &str) -> bool {
    episode_id.contains(COMPOSITE_MARKER)
}

pub fn compose_episode_id(slug: &str, episode_number: u32) -> String {
    format!("{}{}{}", slug, COMPOSITE_MARKER, episode_number)
}

pub fn slug_memo_key(id: &LookupId) -> String {
    format!("idmap:malsync:{}", id)
}

pub fn alternate_memo_key(canonical_id: &CanonicalAnimeId) -> String {
    format!("idmap:arm:{}", canonical_id)
}

pub struct IdentifierResolver {
    slug_lookup: Arc<dyn IdentifierLookup>,
    alternate_lookup: Arc<dyn AlternateIdLookup>,
    cache: CacheLayer,
    memo_ttl: Duration,
}

impl IdentifierResolver {
    pub fn new(
        slug_lookup: Arc<dyn IdentifierLookup>,
        alternate_lookup: Arc<dyn AlternateIdLookup>,
        cache: CacheLayer,
        memo_ttl: Duration,
    ) -> Self {
        Self {
            slug_lookup,
            alternate_lookup,
            cache,
            memo_ttl,
        }
    }

    /// Episode id in the form the provider's source route expects
    pub async fn resolve_episode_id(
        &self,
        provider: StreamProvider,
        canonical_id: &CanonicalAnimeId,
        raw_episode_id: &str,
        episode_number: u32,
    ) -> ResolvedEpisodeId {
        if is_composite_episode_id(raw_episode_id) {
            return ResolvedEpisodeId {
                value: raw_episode_id.to_string(),
                resolution: Resolution::AlreadyComposite,
            };
        }

        match self.resolve_identifier(provider, canonical_id).await {
            Some(identifier) => {
                let value = compose_episode_id(&identifier.slug, episode_number);
                log::debug!(
                    "Resolved {} episode {} of {} to {} ({:?})",
                    provider,
                    episode_number,
                    canonical_id,
                    value,
                    identifier.resolved_via
                );
                ResolvedEpisodeId {
                    value,
                    resolution: identifier.resolved_via.into(),
                }
            }
            None => {
                log::warn!(
                    "No {} identifier for {}, passing '{}' through unresolved",
                    provider,
                    canonical_id,
                    raw_episode_id
                );
                ResolvedEpisodeId {
                    value: raw_episode_id.to_string(),
                    resolution: Resolution::Unresolved,
                }
            }
        }
    }

    /// The provider's slug for an anime, following the fallback chain
    pub async fn resolve_identifier(
        &self,
        provider: StreamProvider,
        canonical_id: &CanonicalAnimeId,
    ) -> Option<ProviderIdentifier> {
        let direct = self
            .slugs_for(&LookupId::Canonical(canonical_id.clone()))
            .await;
        if let Some(slug) = direct.as_ref().and_then(|slugs| slugs.slug_for(provider)) {
            return Some(identifier(provider, canonical_id, slug, ResolvedVia::Direct));
        }

        let slugs = self.fallback_slugs(canonical_id).await?;
        let slug = slugs.slug_for(provider)?;
        Some(identifier(provider, canonical_id, slug, ResolvedVia::FallbackChain))
    }

    /// Identifiers for each of `providers` the lookup chain knows, in the
    /// given order
    pub async fn mapped_providers(
        &self,
        canonical_id: &CanonicalAnimeId,
        providers: &[StreamProvider],
    ) -> Vec<ProviderIdentifier> {
        let direct = self
            .slugs_for(&LookupId::Canonical(canonical_id.clone()))
            .await
            .unwrap_or_default();

        let all_direct = providers
            .iter()
            .all(|provider| direct.slug_for(*provider).is_some());
        let fallback = if all_direct {
            SiteSlugs::new()
        } else {
            self.fallback_slugs(canonical_id).await.unwrap_or_default()
        };

        providers
            .iter()
            .filter_map(|provider| {
                if let Some(slug) = direct.slug_for(*provider) {
                    Some(identifier(*provider, canonical_id, slug, ResolvedVia::Direct))
                } else {
                    fallback.slug_for(*provider).map(|slug| {
                        identifier(*provider, canonical_id, slug, ResolvedVia::FallbackChain)
                    })
                }
            })
            .collect()
    }

    /// Lookup B, then lookup A with the alternate id
    async fn fallback_slugs(&self, canonical_id: &CanonicalAnimeId) -> Option<SiteSlugs> {
        let alternate = self.alternate_for(canonical_id).await?;
        if alternate == canonical_id.as_str() {
            return None;
        }
        self.slugs_for(&LookupId::Alternate(alternate)).await
    }

    async fn slugs_for(&self, id: &LookupId) -> Option<SiteSlugs> {
        let key = slug_memo_key(id);
        if let Some(slugs) = self.cache.get_json::<SiteSlugs>(&key).await {
            return Some(slugs);
        }

        let slugs = self
            .slug_lookup
            .lookup_slugs(id)
            .await
            .filter(|slugs| !slugs.is_empty())?;
        self.cache.put_json(&key, &slugs, self.memo_ttl).await;
        Some(slugs)
    }

    async fn alternate_for(&self, canonical_id: &CanonicalAnimeId) -> Option<String> {
        let key = alternate_memo_key(canonical_id);
        if let Some(alternate) = self.cache.get_json::<String>(&key).await {
            return Some(alternate);
        }

        let alternate = self
            .alternate_lookup
            .alternate_id(canonical_id)
            .await
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())?;
        self.cache.put_json(&key, &alternate, self.memo_ttl).await;
        Some(alternate)
    }
}

fn identifier(
    provider: StreamProvider,
    canonical_id: &CanonicalAnimeId,
    slug: &str,
    resolved_via: ResolvedVia,
) -> ProviderIdentifier {
    ProviderIdentifier {
        provider,
        anilist_id: canonical_id.clone(),
        slug: slug.to_string(),
        resolved_via,
    }
}
