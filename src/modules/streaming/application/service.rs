//! Cache-aside orchestration of episode listings and video sources
//!
//! Upstream failure is never an error here: every client hands back `None`
//! or an empty list, and "nothing anywhere" surfaces as `Ok(None)`. Only
//! caller mistakes (bad ids, unregistered providers) are `Err`.

use super::dto::{EpisodesResponse, VideoRequest};
use crate::modules::provider::domain::entities::{
    AnimeInfo, EpisodeTarget, ProviderEpisodeSet, ProviderIdentifier, VideoData,
};
use crate::modules::provider::domain::services::{IdentifierResolver, MatchTarget, TitleMatcher};
use crate::modules::provider::domain::value_objects::{CanonicalAnimeId, StreamProvider};
use crate::modules::provider::domain::ProviderRegistry;
use crate::modules::provider::traits::{
    AnimeCatalog, ContentProviderClient, EpisodeMetadataSource, SearchableProvider,
    UniversalSourceQuery,
};
use crate::modules::streaming::domain::{cache_keys, EpisodeMerger, TtlPolicy};
use crate::shared::errors::AppResult;
use crate::shared::infrastructure::cache::CacheLayer;
use crate::shared::utils::logger::{LogContext, TimedOperation};
use futures::future::{join_all, BoxFuture, FutureExt};
use std::sync::Arc;

type ListingTask<'a> = BoxFuture<'a, (StreamProvider, Option<ProviderEpisodeSet>)>;

pub struct StreamingService {
    registry: ProviderRegistry,
    resolver: Arc<IdentifierResolver>,
    catalog: Arc<dyn AnimeCatalog>,
    metadata: Arc<dyn EpisodeMetadataSource>,
    matcher: TitleMatcher,
    cache: CacheLayer,
    ttl: TtlPolicy,
}

impl StreamingService {
    pub fn new(
        registry: ProviderRegistry,
        resolver: Arc<IdentifierResolver>,
        catalog: Arc<dyn AnimeCatalog>,
        metadata: Arc<dyn EpisodeMetadataSource>,
        matcher: TitleMatcher,
        cache: CacheLayer,
        ttl: TtlPolicy,
    ) -> Self {
        Self {
            registry,
            resolver,
            catalog,
            metadata,
            matcher,
            cache,
            ttl,
        }
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    pub fn ttl_policy(&self) -> &TtlPolicy {
        &self.ttl
    }

    /// Episode listings from every provider that has the anime
    pub async fn resolve_episodes(
        &self,
        canonical_id: &CanonicalAnimeId,
        is_airing: bool,
        force_refresh: bool,
    ) -> AppResult<Option<EpisodesResponse>> {
        let key = cache_keys::episodes_key(canonical_id);

        if force_refresh {
            self.drop_cached(&key).await;
        } else if let Some(cached) = self.cache.get_json::<EpisodesResponse>(&key).await {
            if !cached.is_empty() {
                return Ok(Some(cached));
            }
        }

        let timer = TimedOperation::new(&format!("resolve_episodes({})", canonical_id));
        let (sets, metadata) = tokio::join!(
            self.fan_out_episodes(canonical_id),
            self.metadata.fetch_episode_meta(canonical_id)
        );

        let providers = EpisodeMerger::assemble(sets, &metadata, &self.registry.providers());
        if providers.is_empty() {
            timer.finish_with_info("no provider listed any episode");
            log::info!("No episodes found for {} on any provider", canonical_id);
            return Ok(None);
        }

        let response = EpisodesResponse { providers };
        self.cache
            .put_json(&key, &response, self.ttl.episodes(is_airing))
            .await;
        timer.finish_with_info(&format!("{} providers", response.providers.len()));
        Ok(Some(response))
    }

    /// Playable sources for one episode, falling back once to the universal
    /// source provider
    pub async fn resolve_video(
        &self,
        request: &VideoRequest,
        force_refresh: bool,
    ) -> AppResult<Option<VideoData>> {
        request.validate()?;
        let client = self.registry.require(request.provider)?;
        let key = request.cache_key();

        if force_refresh {
            self.drop_cached(&key).await;
        } else if let Some(cached) = self.cache.get_json::<VideoData>(&key).await {
            if cached.is_playable() {
                return Ok(Some(cached));
            }
        }

        let timer = TimedOperation::new(&format!(
            "resolve_video({}, {}, {})",
            request.canonical_id, request.provider, request.episode_id
        ));
        let episode_id = self.episode_id_for(client.as_ref(), request).await;
        let video = match client
            .fetch_sources(&episode_id, request.subtype)
            .await
            .and_then(VideoData::into_playable)
        {
            Some(video) => Some(video),
            None => self.secondary_sources(request, &episode_id).await,
        };

        let Some(video) = video else {
            log::info!(
                "No playable sources for {} episode {} on {} ({})",
                request.canonical_id,
                request.episode_number,
                request.provider,
                request.subtype
            );
            timer.finish_with_info("no playable sources");
            return Ok(None);
        };

        self.cache.put_json(&key, &video, self.ttl.video).await;
        timer.finish();
        Ok(Some(video))
    }

    /// Drop a cached episode listing without re-resolving it
    pub async fn invalidate_episodes(&self, canonical_id: &CanonicalAnimeId) -> AppResult<()> {
        self.cache
            .invalidate(&cache_keys::episodes_key(canonical_id))
            .await
    }

    pub async fn invalidate_video(&self, request: &VideoRequest) -> AppResult<()> {
        request.validate()?;
        self.cache.invalidate(&request.cache_key()).await
    }

    async fn drop_cached(&self, key: &str) {
        if let Err(e) = self.cache.invalidate(key).await {
            log::warn!("Forced refresh could not delete {}: {}", key, e);
        }
    }

    async fn episode_id_for(
        &self,
        client: &dyn ContentProviderClient,
        request: &VideoRequest,
    ) -> String {
        if !client.requires_composite_id() {
            return request.episode_id.clone();
        }
        self.resolver
            .resolve_episode_id(
                request.provider,
                &request.canonical_id,
                &request.episode_id,
                request.episode_number,
            )
            .await
            .value
    }

    async fn secondary_sources(&self, request: &VideoRequest, episode_id: &str) -> Option<VideoData> {
        if request.provider == StreamProvider::Anify {
            return None;
        }
        let universal = self.registry.universal()?;
        if universal.provider() == request.provider {
            return None;
        }

        log::info!(
            "{}: No sources for {}, trying {}",
            request.provider,
            episode_id,
            universal.provider()
        );
        let query = UniversalSourceQuery {
            provider: request.provider,
            watch_id: episode_id.to_string(),
            episode_number: request.episode_number,
            canonical_id: request.canonical_id.clone(),
            subtype: request.subtype,
        };
        universal
            .fetch_sources_for(&query)
            .await
            .and_then(VideoData::into_playable)
    }

    /// Query slug-mapped, search-only and (if nothing is mapped) direct
    /// providers concurrently
    async fn fan_out_episodes(&self, canonical_id: &CanonicalAnimeId) -> Vec<ProviderEpisodeSet> {
        let slug_mapped: Vec<StreamProvider> = self
            .registry
            .providers()
            .into_iter()
            .filter(|provider| !provider.is_direct() && !self.registry.is_search_only(*provider))
            .collect();

        let (mapped, info) = tokio::join!(
            self.resolver.mapped_providers(canonical_id, &slug_mapped),
            self.catalog_info(canonical_id)
        );

        let mut tasks: Vec<ListingTask<'_>> = Vec::new();
        self.push_mapped(&mut tasks, canonical_id, &mapped);
        if let Some(info) = info {
            self.push_searched(&mut tasks, canonical_id, info);
        }
        if mapped.is_empty() {
            log::info!(
                "No mapped providers for {}, asking direct providers",
                canonical_id
            );
            self.push_direct(&mut tasks, canonical_id);
            return Self::collect_listings(tasks, canonical_id).await;
        }

        let mut sets = Self::collect_listings(tasks, canonical_id).await;
        if sets.iter().any(|set| set.episode_count() > 0) {
            return sets;
        }

        log::info!(
            "Mapped providers returned no episodes for {}, asking direct providers",
            canonical_id
        );
        let mut direct: Vec<ListingTask<'_>> = Vec::new();
        self.push_direct(&mut direct, canonical_id);
        sets.extend(Self::collect_listings(direct, canonical_id).await);
        sets
    }

    async fn collect_listings(
        tasks: Vec<ListingTask<'_>>,
        canonical_id: &CanonicalAnimeId,
    ) -> Vec<ProviderEpisodeSet> {
        join_all(tasks)
            .await
            .into_iter()
            .filter_map(|(provider, outcome)| {
                let count = outcome
                    .as_ref()
                    .map(ProviderEpisodeSet::episode_count)
                    .filter(|count| *count > 0);
                LogContext::provider_listing(provider.as_str(), canonical_id.as_str(), count);
                outcome
            })
            .collect()
    }

    fn push_mapped<'a>(
        &'a self,
        tasks: &mut Vec<ListingTask<'a>>,
        canonical_id: &CanonicalAnimeId,
        mapped: &[ProviderIdentifier],
    ) {
        for identifier in mapped {
            let Some(client) = self.registry.get(identifier.provider) else {
                continue;
            };
            let target = EpisodeTarget::with_slug(canonical_id.clone(), identifier.slug.clone());
            tasks.push(listing(client, target));
        }
    }

    fn push_searched<'a>(
        &'a self,
        tasks: &mut Vec<ListingTask<'a>>,
        canonical_id: &CanonicalAnimeId,
        info: AnimeInfo,
    ) {
        let info = Arc::new(info);
        for searchable in self.registry.searchable() {
            let provider = searchable.provider();
            let Some(client) = self.registry.get(provider) else {
                continue;
            };
            let searchable = Arc::clone(searchable);
            let info = Arc::clone(&info);
            let canonical_id = canonical_id.clone();

            tasks.push(
                async move {
                    let Some(matched_id) = self.search_match(searchable.as_ref(), &info).await else {
                        return (provider, None);
                    };
                    let target = EpisodeTarget {
                        canonical_id,
                        slug: Some(matched_id),
                        title: Some(info.title.clone()),
                    };
                    (provider, client.fetch_episodes(&target).await)
                }
                .boxed(),
            );
        }
    }

    fn push_direct<'a>(&'a self, tasks: &mut Vec<ListingTask<'a>>, canonical_id: &CanonicalAnimeId) {
        for client in self.registry.clients() {
            if client.provider().is_direct() {
                tasks.push(listing(
                    Arc::clone(client),
                    EpisodeTarget::direct(canonical_id.clone()),
                ));
            }
        }
    }

    /// Catalog facts, only needed when some provider is search-only
    async fn catalog_info(&self, canonical_id: &CanonicalAnimeId) -> Option<AnimeInfo> {
        if self.registry.searchable().is_empty() {
            return None;
        }
        self.catalog.anime_info(canonical_id).await
    }

    /// Provider id of the best-scoring search hit, trying the English title
    /// when the main one finds nothing acceptable
    async fn search_match(&self, provider: &dyn SearchableProvider, info: &AnimeInfo) -> Option<String> {
        let target = MatchTarget::from(info);
        let mut queries = vec![info.title.clone()];
        if let Some(english) = info
            .english_title
            .as_ref()
            .filter(|english| !english.eq_ignore_ascii_case(&info.title))
        {
            queries.push(english.clone());
        }

        for query in queries {
            let candidates = provider.search(&query).await;
            if let Some(best) = self.matcher.best_match(&target, &candidates) {
                return Some(best.candidate.id);
            }
        }

        log::debug!(
            "{}: No acceptable search match for '{}'",
            provider.provider(),
            info.title
        );
        None
    }
}

fn listing<'a>(client: Arc<dyn ContentProviderClient>, target: EpisodeTarget) -> ListingTask<'a> {
    async move {
        let provider = client.provider();
        (provider, client.fetch_episodes(&target).await)
    }
    .boxed()
}
