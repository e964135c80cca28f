//! Shared fakes and fixtures for integration tests
#![allow(dead_code)]

// Same loopback stub the adapter unit tests use
#[path = "../../src/modules/provider/infrastructure/http_client/test_support.rs"]
mod test_support;
pub(crate) use test_support::StubServer;

use anistream::modules::provider::domain::entities::{
    AnimeInfo, EpisodeMeta, EpisodeTarget, ProviderEpisodeSet, SearchCandidate, SiteSlugs,
    VideoData,
};
use anistream::modules::provider::domain::ProviderRegistry;
use anistream::modules::provider::{
    AlternateIdLookup, AnimeCatalog, CanonicalAnimeId, ContentProviderClient,
    EpisodeMetadataSource, IdentifierLookup, LookupId, SearchableProvider, StreamProvider,
    Subtype, UniversalSourceClient, UniversalSourceQuery,
};
use anistream::shared::infrastructure::cache::CacheStore;
use anistream::StreamingService;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Content provider with canned answers that records every call
pub struct FakeProvider {
    provider: StreamProvider,
    composite: bool,
    episodes: Option<ProviderEpisodeSet>,
    sources: HashMap<(String, Subtype), VideoData>,
    pub episode_calls: Mutex<Vec<EpisodeTarget>>,
    pub source_calls: Mutex<Vec<(String, Subtype)>>,
}

impl FakeProvider {
    pub fn new(provider: StreamProvider) -> Self {
        Self {
            provider,
            composite: provider == StreamProvider::HiAnime,
            episodes: None,
            sources: HashMap::new(),
            episode_calls: Mutex::new(Vec::new()),
            source_calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_episodes(mut self, episodes: ProviderEpisodeSet) -> Self {
        self.episodes = Some(episodes);
        self
    }

    pub fn with_sources(mut self, episode_id: &str, subtype: Subtype, video: VideoData) -> Self {
        self.sources.insert((episode_id.to_string(), subtype), video);
        self
    }

    pub fn episode_call_count(&self) -> usize {
        self.episode_calls.lock().unwrap().len()
    }

    pub fn source_call_count(&self) -> usize {
        self.source_calls.lock().unwrap().len()
    }
}

#[async_trait]
impl ContentProviderClient for FakeProvider {
    fn provider(&self) -> StreamProvider {
        self.provider
    }

    fn requires_composite_id(&self) -> bool {
        self.composite
    }

    async fn fetch_episodes(&self, target: &EpisodeTarget) -> Option<ProviderEpisodeSet> {
        self.episode_calls.lock().unwrap().push(target.clone());
        self.episodes.clone()
    }

    async fn fetch_sources(&self, episode_id: &str, subtype: Subtype) -> Option<VideoData> {
        self.source_calls
            .lock()
            .unwrap()
            .push((episode_id.to_string(), subtype));
        self.sources.get(&(episode_id.to_string(), subtype)).cloned()
    }
}

/// Universal source provider answering every query the same way
pub struct FakeUniversal {
    answer: Option<VideoData>,
    pub calls: Mutex<Vec<UniversalSourceQuery>>,
}

impl FakeUniversal {
    pub fn new(answer: Option<VideoData>) -> Self {
        Self {
            answer,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl UniversalSourceClient for FakeUniversal {
    fn provider(&self) -> StreamProvider {
        StreamProvider::Anify
    }

    async fn fetch_sources_for(&self, query: &UniversalSourceQuery) -> Option<VideoData> {
        self.calls.lock().unwrap().push(query.clone());
        self.answer.clone()
    }
}

pub struct FakeSearch {
    provider: StreamProvider,
    results: Vec<SearchCandidate>,
    pub queries: Mutex<Vec<String>>,
}

impl FakeSearch {
    pub fn new(provider: StreamProvider, results: Vec<SearchCandidate>) -> Self {
        Self {
            provider,
            results,
            queries: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl SearchableProvider for FakeSearch {
    fn provider(&self) -> StreamProvider {
        self.provider
    }

    async fn search(&self, query: &str) -> Vec<SearchCandidate> {
        self.queries.lock().unwrap().push(query.to_string());
        self.results.clone()
    }
}

#[derive(Default)]
pub struct FakeSlugLookup {
    slugs: HashMap<String, SiteSlugs>,
    pub calls: AtomicUsize,
}

impl FakeSlugLookup {
    /// Answer `id` (formatted like the memo key suffix) with `pairs`
    pub fn with(mut self, id: &str, pairs: &[(StreamProvider, &str)]) -> Self {
        let mut slugs = SiteSlugs::new();
        for (provider, slug) in pairs {
            slugs.insert(*provider, slug);
        }
        self.slugs.insert(id.to_string(), slugs);
        self
    }
}

#[async_trait]
impl IdentifierLookup for FakeSlugLookup {
    async fn lookup_slugs(&self, id: &LookupId) -> Option<SiteSlugs> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.slugs.get(&id.to_string()).cloned()
    }
}

#[derive(Default)]
pub struct FakeAlternateLookup {
    ids: HashMap<String, String>,
}

impl FakeAlternateLookup {
    pub fn with(mut self, canonical: &str, alternate: &str) -> Self {
        self.ids.insert(canonical.to_string(), alternate.to_string());
        self
    }
}

#[async_trait]
impl AlternateIdLookup for FakeAlternateLookup {
    async fn alternate_id(&self, canonical_id: &CanonicalAnimeId) -> Option<String> {
        self.ids.get(canonical_id.as_str()).cloned()
    }
}

#[derive(Default)]
pub struct FakeCatalog {
    info: Option<AnimeInfo>,
}

impl FakeCatalog {
    pub fn with(info: AnimeInfo) -> Self {
        Self { info: Some(info) }
    }
}

#[async_trait]
impl AnimeCatalog for FakeCatalog {
    async fn anime_info(&self, _canonical_id: &CanonicalAnimeId) -> Option<AnimeInfo> {
        self.info.clone()
    }
}

#[derive(Default)]
pub struct FakeMetadata {
    meta: Vec<EpisodeMeta>,
}

impl FakeMetadata {
    pub fn with(meta: Vec<EpisodeMeta>) -> Self {
        Self { meta }
    }
}

#[async_trait]
impl EpisodeMetadataSource for FakeMetadata {
    async fn fetch_episode_meta(&self, _canonical_id: &CanonicalAnimeId) -> Vec<EpisodeMeta> {
        self.meta.clone()
    }
}

/// Wire a service from fakes; lookups default to knowing nothing
pub fn build_service(
    registry: ProviderRegistry,
    slug_lookup: FakeSlugLookup,
    alternate_lookup: FakeAlternateLookup,
    catalog: FakeCatalog,
    metadata: FakeMetadata,
    store: Arc<dyn CacheStore>,
) -> StreamingService {
    StreamingService::builder()
        .registry(registry)
        .slug_lookup(Arc::new(slug_lookup))
        .alternate_lookup(Arc::new(alternate_lookup))
        .catalog(Arc::new(catalog))
        .metadata(Arc::new(metadata))
        .cache_store(store)
        .build()
        .expect("test service wiring is complete")
}
