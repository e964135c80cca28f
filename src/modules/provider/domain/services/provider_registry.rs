use crate::modules::provider::domain::value_objects::StreamProvider;
use crate::modules::provider::infrastructure::adapters::{
    AnifyAdapter, AnimePaheAdapter, ConsumetMetaAdapter, GogoanimeAdapter, HiAnimeAdapter,
};
use crate::modules::provider::traits::{
    ContentProviderClient, SearchableProvider, UniversalSourceClient,
};
use crate::shared::config::EngineConfig;
use crate::shared::errors::{AppError, AppResult};
use std::sync::Arc;

/// Content providers keyed by [`StreamProvider`], kept in registration order
///
/// Registration order is the order episode listings are returned in.
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    clients: Vec<Arc<dyn ContentProviderClient>>,
    searchable: Vec<Arc<dyn SearchableProvider>>,
    universal: Option<Arc<dyn UniversalSourceClient>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every upstream the engine knows, wired from configuration
    pub fn from_config(config: &EngineConfig) -> AppResult<Self> {
        let anime_pahe = Arc::new(AnimePaheAdapter::new(config)?);
        let anify = Arc::new(AnifyAdapter::new(config)?);

        let mut registry = Self::new();
        registry.register(Arc::new(HiAnimeAdapter::new(config)?));
        registry.register(Arc::new(GogoanimeAdapter::new(config)?));
        registry.register(anime_pahe.clone());
        registry.register(anify.clone());
        registry.register(Arc::new(ConsumetMetaAdapter::new(config)?));
        registry.register_searchable(anime_pahe);
        registry.set_universal(anify);

        log::info!(
            "Registered {} content providers: {}",
            registry.clients.len(),
            registry
                .providers()
                .iter()
                .map(StreamProvider::as_str)
                .collect::<Vec<_>>()
                .join(", ")
        );
        Ok(registry)
    }

    /// Add a client; a second client for the same provider replaces the first
    /// in place
    pub fn register(&mut self, client: Arc<dyn ContentProviderClient>) {
        let provider = client.provider();
        match self.clients.iter().position(|c| c.provider() == provider) {
            Some(index) => self.clients[index] = client,
            None => self.clients.push(client),
        }
    }

    pub fn register_searchable(&mut self, provider: Arc<dyn SearchableProvider>) {
        let name = provider.provider();
        self.searchable.retain(|p| p.provider() != name);
        self.searchable.push(provider);
    }

    pub fn set_universal(&mut self, client: Arc<dyn UniversalSourceClient>) {
        self.universal = Some(client);
    }

    pub fn get(&self, provider: StreamProvider) -> Option<Arc<dyn ContentProviderClient>> {
        self.clients
            .iter()
            .find(|client| client.provider() == provider)
            .cloned()
    }

    /// Like [`get`](Self::get), but an unregistered provider is the caller's
    /// mistake
    pub fn require(&self, provider: StreamProvider) -> AppResult<Arc<dyn ContentProviderClient>> {
        self.get(provider).ok_or_else(|| {
            AppError::InvalidInput(format!("Provider '{}' is not registered", provider))
        })
    }

    pub fn clients(&self) -> &[Arc<dyn ContentProviderClient>] {
        &self.clients
    }

    pub fn providers(&self) -> Vec<StreamProvider> {
        self.clients.iter().map(|client| client.provider()).collect()
    }

    pub fn searchable(&self) -> &[Arc<dyn SearchableProvider>] {
        &self.searchable
    }

    /// Providers reached only through title search are never slug-mapped
    pub fn is_search_only(&self, provider: StreamProvider) -> bool {
        self.searchable.iter().any(|p| p.provider() == provider)
    }

    pub fn universal(&self) -> Option<Arc<dyn UniversalSourceClient>> {
        self.universal.clone()
    }

    pub fn position(&self, provider: StreamProvider) -> Option<usize> {
        self.clients.iter().position(|client| client.provider() == provider)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::provider::traits::{MockContentProviderClient, MockSearchableProvider};

    fn client(provider: StreamProvider) -> Arc<dyn ContentProviderClient> {
        let mut mock = MockContentProviderClient::new();
        mock.expect_provider().return_const(provider);
        Arc::new(mock)
    }

    #[test]
    fn test_registration_order_is_kept() {
        let mut registry = ProviderRegistry::new();
        registry.register(client(StreamProvider::Gogoanime));
        registry.register(client(StreamProvider::HiAnime));
        registry.register(client(StreamProvider::Gogoanime));

        assert_eq!(
            registry.providers(),
            vec![StreamProvider::Gogoanime, StreamProvider::HiAnime]
        );
        assert_eq!(registry.position(StreamProvider::HiAnime), Some(1));
    }

    #[test]
    fn test_require_unregistered_is_invalid_input() {
        let registry = ProviderRegistry::new();
        let err = registry.require(StreamProvider::Anify).err().unwrap();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }

    #[test]
    fn test_search_only_providers() {
        let mut searchable = MockSearchableProvider::new();
        searchable
            .expect_provider()
            .return_const(StreamProvider::AnimePahe);

        let mut registry = ProviderRegistry::new();
        registry.register_searchable(Arc::new(searchable));

        assert!(registry.is_search_only(StreamProvider::AnimePahe));
        assert!(!registry.is_search_only(StreamProvider::HiAnime));
    }

    #[test]
    fn test_from_config_registers_every_provider() {
        let registry = ProviderRegistry::from_config(&EngineConfig::default()).unwrap();
        assert_eq!(registry.providers(), StreamProvider::ALL.to_vec());
        assert!(registry.universal().is_some());
        assert_eq!(registry.searchable().len(), 1);
    }
}
