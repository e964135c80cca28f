//! AniList catalog adapter
//!
//! Only used to learn a show's title, year and format so search-only
//! providers can be matched by title.

use serde_json::{json, Value};

use crate::{
    modules::provider::{
        domain::{entities::AnimeInfo, value_objects::CanonicalAnimeId},
        infrastructure::http_client::{RateLimitClient, UpstreamResultExt},
        traits::AnimeCatalog,
    },
    shared::{
        config::EngineConfig,
        errors::{AppError, AppResult},
    },
};
use async_trait::async_trait;

use super::{models::*, queries::*};

pub struct AniListAdapter {
    http_client: RateLimitClient,
    base_url: String,
}

impl AniListAdapter {
    pub fn new(config: &EngineConfig) -> AppResult<Self> {
        Ok(Self::with_client(
            RateLimitClient::for_anilist(config)?,
            &config.upstreams.anilist,
        ))
    }

    pub fn with_client(http_client: RateLimitClient, base_url: &str) -> Self {
        Self {
            http_client,
            base_url: base_url.to_string(),
        }
    }

    /// Check if a request can be made now (for testing)
    pub fn can_make_request_now(&self) -> bool {
        self.http_client.can_make_request_now()
    }

    async fn make_graphql_request<T>(&self, query: &str, variables: Option<Value>) -> AppResult<T>
    where
        T: serde::de::DeserializeOwned,
    {
        let mut body = json!({
            "query": query
        });

        if let Some(vars) = variables {
            body["variables"] = vars;
        }

        let graphql_response: Value = self.http_client.post_json(&self.base_url, &body).await?;

        if let Some(errors) = graphql_response.get("errors").filter(|e| !e.is_null()) {
            return Err(AppError::ApiError(format!(
                "AniList GraphQL errors: {}",
                errors
            )));
        }

        let data = graphql_response
            .get("data")
            .ok_or_else(|| AppError::ApiError("No data field in AniList response".to_string()))?;

        serde_json::from_value(data.clone()).map_err(|e| {
            AppError::SerializationError(format!("Failed to deserialize AniList data: {}", e))
        })
    }

    pub fn map_media(media: Media) -> Option<AnimeInfo> {
        let title = media.title.unwrap_or_default();
        let english_title = title.english.clone();
        let main_title = title.romaji.or(title.user_preferred).or(title.english)?;

        Some(AnimeInfo {
            title: main_title,
            english_title,
            year: media
                .season_year
                .or_else(|| media.start_date.and_then(|date| date.year)),
            format: media
                .format
                .and_then(|format| format.search_label())
                .map(str::to_string),
        })
    }
}

#[async_trait]
impl AnimeCatalog for AniListAdapter {
    async fn anime_info(&self, canonical_id: &CanonicalAnimeId) -> Option<AnimeInfo> {
        let Ok(anime_id) = canonical_id.as_str().parse::<u32>() else {
            log::warn!("AniList: '{}' is not a numeric AniList id", canonical_id);
            return None;
        };

        let response: MediaResponse = self
            .make_graphql_request(MEDIA_INFO_QUERY, Some(json!({ "id": anime_id })))
            .await
            .or_log("AniList", &format!("media {}", canonical_id))?;

        let info = response.media.and_then(Self::map_media);
        if let Some(info) = &info {
            log::debug!(
                "AniList: {} is '{}' ({:?}, {:?})",
                canonical_id,
                info.title,
                info.format,
                info.year
            );
        }
        info
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::provider::infrastructure::http_client::test_support::StubServer;
    use crate::shared::config::RateLimitSettings;
    use std::time::Duration;

    fn adapter(server: &StubServer) -> AniListAdapter {
        let client = RateLimitClient::new(
            "AniList",
            RateLimitSettings::new(100.0, 10),
            Duration::from_secs(5),
            "anistream-tests",
        )
        .unwrap();
        AniListAdapter::with_client(client, &server.url("/"))
    }

    #[test]
    fn test_map_media_prefers_romaji_and_season_year() {
        let media: Media = serde_json::from_value(json!({
            "id": 21,
            "title": {"romaji": "ONE PIECE", "english": "One Piece"},
            "format": "TV",
            "seasonYear": 1999,
            "startDate": {"year": 1999}
        }))
        .unwrap();

        let info = AniListAdapter::map_media(media).unwrap();
        assert_eq!(info.title, "ONE PIECE");
        assert_eq!(info.english_title.as_deref(), Some("One Piece"));
        assert_eq!(info.year, Some(1999));
        assert_eq!(info.format.as_deref(), Some("TV"));
    }

    #[test]
    fn test_map_media_falls_back_to_start_date() {
        let media: Media = serde_json::from_value(json!({
            "id": 199,
            "title": {"romaji": "Sen to Chihiro no Kamikakushi"},
            "format": "MOVIE",
            "seasonYear": null,
            "startDate": {"year": 2001}
        }))
        .unwrap();

        let info = AniListAdapter::map_media(media).unwrap();
        assert_eq!(info.year, Some(2001));
        assert_eq!(info.format.as_deref(), Some("Movie"));
    }

    #[test]
    fn test_unknown_format_is_tolerated() {
        let media: Media = serde_json::from_value(json!({
            "id": 1,
            "title": {"english": "Thing"},
            "format": "HOLOGRAM"
        }))
        .unwrap();

        let info = AniListAdapter::map_media(media).unwrap();
        assert_eq!(info.title, "Thing");
        assert!(info.format.is_none());
    }

    #[tokio::test]
    async fn test_anime_info_posts_graphql() {
        let server = StubServer::start().await;
        server.route(
            "/",
            200,
            json!({"data": {"Media": {"id": 21, "title": {"romaji": "ONE PIECE"}, "format": "TV"}}})
                .to_string(),
        );

        let info = adapter(&server)
            .anime_info(&CanonicalAnimeId::from(21u32))
            .await
            .unwrap();
        assert_eq!(info.title, "ONE PIECE");

        let requests = server.requests();
        assert_eq!(requests[0].method, "POST");
        assert!(requests[0].body.contains("\"id\":21"));
    }

    #[tokio::test]
    async fn test_graphql_errors_are_none() {
        let server = StubServer::start().await;
        server.route(
            "/",
            200,
            json!({"data": null, "errors": [{"message": "Not Found.", "status": 404}]}).to_string(),
        );

        assert!(adapter(&server)
            .anime_info(&CanonicalAnimeId::from(1u32))
            .await
            .is_none());
    }

    #[tokio::test]
    async fn test_non_numeric_id_is_none_without_request() {
        let server = StubServer::start().await;
        assert!(adapter(&server)
            .anime_info(&CanonicalAnimeId::parse("abc").unwrap())
            .await
            .is_none());
        assert!(server.requests().is_empty());
    }
}
