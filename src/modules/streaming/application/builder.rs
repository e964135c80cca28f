use super::service::StreamingService;
use crate::modules::provider::domain::services::{
    IdentifierResolver, ProviderRegistry, TitleMatchConfig, TitleMatcher,
};
use crate::modules::provider::infrastructure::adapters::{
    AniListAdapter, AniZipAdapter, ArmAdapter, MalSyncAdapter,
};
use crate::modules::provider::traits::{
    AlternateIdLookup, AnimeCatalog, EpisodeMetadataSource, IdentifierLookup,
};
use crate::modules::streaming::domain::TtlPolicy;
use crate::shared::config::EngineConfig;
use crate::shared::errors::{AppError, AppResult};
use crate::shared::infrastructure::cache::{
    CacheLayer, CacheStore, InMemoryCacheStore, RedisCacheStore,
};
use std::sync::Arc;

/// Assembles a [`StreamingService`] from explicitly injected parts
///
/// Every collaborator is required except the TTL policy and the match
/// configuration, which fall back to their defaults.
#[derive(Default)]
pub struct StreamingServiceBuilder {
    registry: Option<ProviderRegistry>,
    slug_lookup: Option<Arc<dyn IdentifierLookup>>,
    alternate_lookup: Option<Arc<dyn AlternateIdLookup>>,
    catalog: Option<Arc<dyn AnimeCatalog>>,
    metadata: Option<Arc<dyn EpisodeMetadataSource>>,
    cache_store: Option<Arc<dyn CacheStore>>,
    ttl: TtlPolicy,
    match_config: TitleMatchConfig,
}

impl StreamingServiceBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn registry(mut self, registry: ProviderRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn slug_lookup(mut self, lookup: Arc<dyn IdentifierLookup>) -> Self {
        self.slug_lookup = Some(lookup);
        self
    }

    pub fn alternate_lookup(mut self, lookup: Arc<dyn AlternateIdLookup>) -> Self {
        self.alternate_lookup = Some(lookup);
        self
    }

    pub fn catalog(mut self, catalog: Arc<dyn AnimeCatalog>) -> Self {
        self.catalog = Some(catalog);
        self
    }

    pub fn metadata(mut self, metadata: Arc<dyn EpisodeMetadataSource>) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn cache_store(mut self, store: Arc<dyn CacheStore>) -> Self {
        self.cache_store = Some(store);
        self
    }

    pub fn ttl_policy(mut self, ttl: TtlPolicy) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn match_config(mut self, config: TitleMatchConfig) -> Self {
        self.match_config = config;
        self
    }

    pub fn build(self) -> AppResult<StreamingService> {
        self.match_config
            .validate()
            .map_err(AppError::ConfigError)?;

        let registry = self.registry.ok_or_else(|| missing("provider registry"))?;
        let slug_lookup = self.slug_lookup.ok_or_else(|| missing("slug lookup"))?;
        let alternate_lookup = self
            .alternate_lookup
            .ok_or_else(|| missing("alternate id lookup"))?;
        let catalog = self.catalog.ok_or_else(|| missing("anime catalog"))?;
        let metadata = self.metadata.ok_or_else(|| missing("episode metadata source"))?;
        let store = self.cache_store.ok_or_else(|| missing("cache store"))?;

        let cache = CacheLayer::new(store);
        let resolver = IdentifierResolver::new(
            slug_lookup,
            alternate_lookup,
            cache.clone(),
            self.ttl.identifier,
        );

        Ok(StreamingService::new(
            registry,
            Arc::new(resolver),
            catalog,
            metadata,
            TitleMatcher::new(self.match_config),
            cache,
            self.ttl,
        ))
    }
}

fn missing(part: &str) -> AppError {
    AppError::ConfigError(format!("StreamingService needs a {}", part))
}

impl StreamingService {
    pub fn builder() -> StreamingServiceBuilder {
        StreamingServiceBuilder::new()
    }

    /// Production wiring: every upstream adapter, and Redis when `redis_url`
    /// is set, otherwise the in-memory store
    pub async fn from_config(config: &EngineConfig) -> AppResult<Self> {
        config.validate()?;
        let store = cache_store_for(config).await?;
        Self::from_config_with_store(config, store)
    }

    /// Like [`from_config`](Self::from_config) with an explicit cache store
    pub fn from_config_with_store(
        config: &EngineConfig,
        store: Arc<dyn CacheStore>,
    ) -> AppResult<Self> {
        config.validate()?;

        Self::builder()
            .registry(ProviderRegistry::from_config(config)?)
            .slug_lookup(Arc::new(MalSyncAdapter::new(config)?))
            .alternate_lookup(Arc::new(ArmAdapter::new(config)?))
            .catalog(Arc::new(AniListAdapter::new(config)?))
            .metadata(Arc::new(AniZipAdapter::new(config)?))
            .cache_store(store)
            .ttl_policy(TtlPolicy::from_config(config))
            .match_config(TitleMatchConfig::new().with_threshold(config.title_match_threshold))
            .build()
    }
}

async fn cache_store_for(config: &EngineConfig) -> AppResult<Arc<dyn CacheStore>> {
    match &config.redis_url {
        Some(url) => {
            let store = RedisCacheStore::connect(url).await?;
            store.ping().await?;
            log::info!("Using Redis cache store");
            Ok(Arc::new(store))
        }
        None => {
            log::info!(
                "Using in-memory cache store (max {} entries)",
                config.cache_max_entries
            );
            Ok(Arc::new(InMemoryCacheStore::new(config.cache_max_entries)))
        }
    }
}
