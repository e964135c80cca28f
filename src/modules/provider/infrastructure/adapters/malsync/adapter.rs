//! MALSync identifier lookup
//!
//! Maps a canonical (AniList) or MyAnimeList id onto the slug each streaming
//! site uses for the show.

use super::models::{MalSyncResponse, MalSyncSiteEntry};
use crate::modules::provider::domain::entities::SiteSlugs;
use crate::modules::provider::domain::value_objects::StreamProvider;
use crate::modules::provider::infrastructure::http_client::{RateLimitClient, UpstreamResultExt};
use crate::modules::provider::traits::{IdentifierLookup, LookupId};
use crate::shared::config::EngineConfig;
use crate::shared::errors::AppResult;
use async_trait::async_trait;

pub struct MalSyncAdapter {
    http_client: RateLimitClient,
    base_url: String,
}

impl MalSyncAdapter {
    pub fn new(config: &EngineConfig) -> AppResult<Self> {
        Ok(Self::with_client(
            RateLimitClient::from_config("MALSync", config)?,
            &config.upstreams.malsync,
        ))
    }

    pub fn with_client(http_client: RateLimitClient, base_url: &str) -> Self {
        Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn lookup_url(&self, id: &LookupId) -> String {
        match id {
            LookupId::Canonical(canonical) => format!(
                "{}/mal/anime/anilist:{}",
                self.base_url,
                urlencoding::encode(canonical.as_str())
            ),
            LookupId::Alternate(mal_id) => format!(
                "{}/mal/anime/{}",
                self.base_url,
                urlencoding::encode(mal_id)
            ),
        }
    }

    /// Reduce the MALSync site map to one slug per known provider
    pub fn extract_slugs(response: &MalSyncResponse) -> SiteSlugs {
        let mut slugs = SiteSlugs::new();

        for (site, entries) in response.site_entries() {
            let Some(provider) = StreamProvider::from_malsync_site(&site) else {
                continue;
            };

            // Prefer the sub listing when a site also carries a separate dub entry
            let mut ordered: Vec<&(String, MalSyncSiteEntry)> = entries.iter().collect();
            ordered.sort_by_key(|(key, _)| key.ends_with("-dub"));

            for (key, entry) in ordered {
                if let Some(slug) = entry_slug(key, entry) {
                    slugs.insert(provider, &slug);
                    break;
                }
            }
        }

        slugs
    }
}

/// Site slug: last URL path segment, else the identifier, else the map key
fn entry_slug(key: &str, entry: &MalSyncSiteEntry) -> Option<String> {
    let from_url = entry.url.as_deref().and_then(|url| {
        url.split(['?', '#'])
            .next()
            .and_then(|path| path.trim_end_matches('/').rsplit('/').next())
            .filter(|segment| !segment.is_empty() && !segment.contains(':'))
            .map(str::to_string)
    });

    from_url
        .or_else(|| entry.identifier.clone())
        .or_else(|| Some(key.to_string()))
        .map(|slug| slug.trim().to_string())
        .filter(|slug| !slug.is_empty())
}

#[async_trait]
impl IdentifierLookup for MalSyncAdapter {
    async fn lookup_slugs(&self, id: &LookupId) -> Option<SiteSlugs> {
        let url = self.lookup_url(id);
        let response: MalSyncResponse = self
            .http_client
            .get(&url)
            .await
            .or_log("MALSync", &format!("slug lookup for {}", id))?;

        let slugs = Self::extract_slugs(&response);
        if slugs.is_empty() {
            log::debug!("MALSync: No supported sites listed for {}", id);
            return None;
        }

        log::debug!(
            "MALSync: {} mapped to {} provider(s): {:?}",
            id,
            slugs.len(),
            slugs.providers()
        );
        Some(slugs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::provider::domain::value_objects::CanonicalAnimeId;
    use crate::modules::provider::infrastructure::http_client::test_support::StubServer;
    use crate::shared::config::RateLimitSettings;
    use serde_json::json;
    use std::time::Duration;

    fn fixture() -> serde_json::Value {
        json!({
            "id": 21,
            "title": "One Piece",
            "Sites": {
                "Zoro": {
                    "100": {
                        "identifier": "100",
                        "url": "https://hianime.to/one-piece-100",
                        "title": "One Piece"
                    }
                },
                "Gogoanime": {
                    "one-piece-dub": {
                        "identifier": "one-piece-dub",
                        "url": "https://anitaku.pe/category/one-piece-dub"
                    },
                    "one-piece": {
                        "identifier": "one-piece",
                        "url": "https://anitaku.pe/category/one-piece"
                    }
                },
                "Crunchyroll": {
                    "GRMG8ZQZR": {"identifier": "GRMG8ZQZR", "url": "https://crunchyroll.com/x"}
                }
            }
        })
    }

    fn adapter(server: &StubServer) -> MalSyncAdapter {
        let client = RateLimitClient::new(
            "MALSync",
            RateLimitSettings::new(100.0, 10),
            Duration::from_secs(5),
            "anistream-tests",
        )
        .unwrap();
        MalSyncAdapter::with_client(client, &server.base_url())
    }

    #[test]
    fn test_extract_slugs() {
        let response: MalSyncResponse = serde_json::from_value(fixture()).unwrap();
        let slugs = MalSyncAdapter::extract_slugs(&response);

        assert_eq!(slugs.slug_for(StreamProvider::HiAnime), Some("one-piece-100"));
        assert_eq!(slugs.slug_for(StreamProvider::Gogoanime), Some("one-piece"));
        assert_eq!(slugs.len(), 2);
    }

    #[test]
    fn test_missing_sites_is_empty() {
        let response: MalSyncResponse =
            serde_json::from_value(json!({"id": 1, "Sites": null})).unwrap();
        assert!(MalSyncAdapter::extract_slugs(&response).is_empty());
    }

    #[test]
    fn test_entry_without_url_falls_back_to_identifier() {
        let entry = MalSyncSiteEntry {
            identifier: Some("bleach".into()),
            url: None,
            title: None,
        };
        assert_eq!(entry_slug("key", &entry), Some("bleach".to_string()));
    }

    #[tokio::test]
    async fn test_lookup_by_canonical_id() {
        let server = StubServer::start().await;
        server.route("/mal/anime/anilist:21", 200, fixture().to_string());

        let slugs = adapter(&server)
            .lookup_slugs(&LookupId::Canonical(CanonicalAnimeId::from(21u32)))
            .await
            .unwrap();
        assert_eq!(slugs.slug_for(StreamProvider::HiAnime), Some("one-piece-100"));
    }

    #[tokio::test]
    async fn test_lookup_by_alternate_id() {
        let server = StubServer::start().await;
        server.route("/mal/anime/21", 200, fixture().to_string());

        let slugs = adapter(&server)
            .lookup_slugs(&LookupId::Alternate("21".into()))
            .await;
        assert!(slugs.is_some());
    }

    #[tokio::test]
    async fn test_not_found_is_none() {
        let server = StubServer::start().await;
        let slugs = adapter(&server)
            .lookup_slugs(&LookupId::Canonical(CanonicalAnimeId::from(999u32)))
            .await;
        assert!(slugs.is_none());
    }
}
