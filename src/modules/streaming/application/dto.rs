use crate::modules::provider::domain::entities::ProviderEpisodeSet;
use crate::modules::provider::domain::value_objects::{CanonicalAnimeId, StreamProvider, Subtype};
use crate::modules::streaming::domain::cache_keys;
use crate::shared::errors::{AppError, AppResult};
use crate::shared::infrastructure::cache::Cacheable;
use serde::{Deserialize, Serialize};

/// One episode's video, as asked for by the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoRequest {
    pub canonical_id: CanonicalAnimeId,
    pub provider: StreamProvider,
    /// The provider's episode id as returned in an episode listing
    pub episode_id: String,
    pub episode_number: u32,
    #[serde(default)]
    pub subtype: Subtype,
}

impl VideoRequest {
    pub fn new(
        canonical_id: CanonicalAnimeId,
        provider: StreamProvider,
        episode_id: impl Into<String>,
        episode_number: u32,
        subtype: Subtype,
    ) -> Self {
        Self {
            canonical_id,
            provider,
            episode_id: episode_id.into(),
            episode_number,
            subtype,
        }
    }

    /// Build from untyped input; unknown providers and subtypes are rejected
    pub fn parse(
        canonical_id: &str,
        provider: &str,
        episode_id: &str,
        episode_number: u32,
        subtype: &str,
    ) -> AppResult<Self> {
        let request = Self::new(
            CanonicalAnimeId::parse(canonical_id)?,
            provider.parse()?,
            episode_id.trim(),
            episode_number,
            subtype.parse()?,
        );
        request.validate()?;
        Ok(request)
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.canonical_id.as_str().trim().is_empty() {
            return Err(AppError::InvalidInput(
                "Canonical anime id cannot be empty".to_string(),
            ));
        }
        if self.episode_id.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "Episode id cannot be empty".to_string(),
            ));
        }
        if self.episode_number < 1 {
            return Err(AppError::InvalidInput(format!(
                "Episode number must be at least 1, got {}",
                self.episode_number
            )));
        }
        Ok(())
    }

    pub fn cache_key(&self) -> String {
        cache_keys::stream_key(
            self.provider,
            &self.canonical_id,
            &self.episode_id,
            self.subtype,
        )
    }
}

/// Episode listings for one anime, one entry per provider that had any
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EpisodesResponse {
    pub providers: Vec<ProviderEpisodeSet>,
}

impl EpisodesResponse {
    pub fn is_empty(&self) -> bool {
        self.providers.iter().all(ProviderEpisodeSet::is_empty)
    }

    pub fn provider(&self, provider: StreamProvider) -> Option<&ProviderEpisodeSet> {
        self.providers.iter().find(|set| set.provider_id == provider)
    }
}

impl Cacheable for EpisodesResponse {
    fn is_cacheable(&self) -> bool {
        !self.is_empty()
    }
}
