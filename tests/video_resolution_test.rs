mod utils;

use anistream::modules::provider::domain::entities::{VideoData, VideoSource};
use anistream::modules::provider::domain::ProviderRegistry;
use anistream::modules::provider::infrastructure::adapters::GogoanimeAdapter;
use anistream::modules::provider::infrastructure::RateLimitClient;
use anistream::modules::provider::{CanonicalAnimeId, StreamProvider, Subtype};
use anistream::shared::config::RateLimitSettings;
use anistream::shared::infrastructure::cache::{CacheStore, InMemoryCacheStore};
use anistream::{AppError, VideoRequest};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use utils::*;

fn hls(url: &str) -> VideoData {
    VideoData {
        sources: vec![VideoSource {
            url: url.to_string(),
            quality: Some("auto".to_string()),
            is_hls: true,
            source_type: None,
        }],
        ..Default::default()
    }
}

fn request(provider: StreamProvider, episode_id: &str, number: u32, subtype: Subtype) -> VideoRequest {
    VideoRequest::new(CanonicalAnimeId::from(21u32), provider, episode_id, number, subtype)
}

fn service_with(
    registry: ProviderRegistry,
    slugs: FakeSlugLookup,
    store: Arc<dyn CacheStore>,
) -> anistream::StreamingService {
    build_service(
        registry,
        slugs,
        FakeAlternateLookup::default(),
        FakeCatalog::default(),
        FakeMetadata::default(),
        store,
    )
}

#[tokio::test]
async fn test_gogoanime_sources_are_resolved_and_cached() {
    let server = StubServer::start().await;
    server.route(
        "/anime/gogoanime/watch/one-piece-episode-1",
        200,
        json!({
            "headers": {"Referer": "https://gogoanime.example/"},
            "sources": [
                {"url": "https://cdn.example/one-piece/1/master.m3u8", "isM3U8": true, "quality": "default"}
            ],
            "subtitles": [
                {"url": "https://cdn.example/one-piece/1/en.vtt", "lang": "English", "default": true},
                {"url": "https://cdn.example/one-piece/1/es.vtt", "lang": "Spanish"}
            ],
            "intro": {"start": 0, "end": 0}
        })
        .to_string(),
    );

    let client = RateLimitClient::new(
        "Gogoanime",
        RateLimitSettings::new(50.0, 10),
        Duration::from_secs(5),
        "anistream-tests",
    )
    .unwrap();
    let mut registry = ProviderRegistry::new();
    registry.register(Arc::new(GogoanimeAdapter::with_client(
        client,
        &server.base_url(),
    )));

    let store = Arc::new(InMemoryCacheStore::new(100));
    let service = service_with(registry, FakeSlugLookup::default(), store.clone());

    let video = service
        .resolve_video(
            &request(StreamProvider::Gogoanime, "one-piece-episode-1", 1, Subtype::Sub),
            false,
        )
        .await
        .unwrap()
        .expect("sources from fixture");

    assert_eq!(video.sources.len(), 1);
    assert!(video.sources[0].is_hls);
    assert_eq!(video.tracks.len(), 2);
    assert!(video.tracks[0].is_default);
    assert_eq!(video.intro, None);
    assert_eq!(
        video.headers.get("Referer").map(String::as_str),
        Some("https://gogoanime.example/")
    );

    let entry = store
        .get("stream:gogoanime:21:one-piece-episode-1:sub")
        .await
        .unwrap()
        .expect("resolution is cached");
    assert_eq!(entry.ttl_seconds, 1500);

    // Second call is served from the cache
    let again = service
        .resolve_video(
            &request(StreamProvider::Gogoanime, "one-piece-episode-1", 1, Subtype::Sub),
            false,
        )
        .await
        .unwrap();
    assert_eq!(again, Some(video));
    assert_eq!(server.requests().len(), 1);
}

#[tokio::test]
async fn test_upstream_failure_is_not_an_error() {
    let server = StubServer::start().await;
    let client = RateLimitClient::new(
        "Gogoanime",
        RateLimitSettings::new(50.0, 10),
        Duration::from_secs(5),
        "anistream-tests",
    )
    .unwrap();
    let mut registry = ProviderRegistry::new();
    registry.register(Arc::new(GogoanimeAdapter::with_client(
        client,
        &server.base_url(),
    )));

    let store = Arc::new(InMemoryCacheStore::new(100));
    let service = service_with(registry, FakeSlugLookup::default(), store.clone());

    let video = service
        .resolve_video(
            &request(StreamProvider::Gogoanime, "missing-episode-1", 1, Subtype::Sub),
            false,
        )
        .await
        .unwrap();

    assert_eq!(video, None);
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_secondary_is_tried_exactly_once() {
    let primary = Arc::new(FakeProvider::new(StreamProvider::Gogoanime));
    let universal = Arc::new(FakeUniversal::new(Some(hls("https://anify.example/1.m3u8"))));

    let mut registry = ProviderRegistry::new();
    registry.register(primary.clone());
    registry.set_universal(universal.clone());

    let store = Arc::new(InMemoryCacheStore::new(100));
    let service = service_with(registry, FakeSlugLookup::default(), store.clone());

    let video = service
        .resolve_video(
            &request(StreamProvider::Gogoanime, "one-piece-episode-1", 1, Subtype::Dub),
            false,
        )
        .await
        .unwrap()
        .unwrap();

    assert_eq!(video.sources[0].url, "https://anify.example/1.m3u8");
    assert_eq!(primary.source_call_count(), 1);
    assert_eq!(universal.call_count(), 1);

    let query = universal.calls.lock().unwrap()[0].clone();
    assert_eq!(query.provider, StreamProvider::Gogoanime);
    assert_eq!(query.watch_id, "one-piece-episode-1");
    assert_eq!(query.episode_number, 1);
    assert_eq!(query.subtype, Subtype::Dub);

    // The secondary's answer is cached under the requested provider
    assert!(store.contains_key("stream:gogoanime:21:one-piece-episode-1:dub"));
}

#[tokio::test]
async fn test_nothing_anywhere_is_none_and_uncached() {
    let primary = Arc::new(FakeProvider::new(StreamProvider::Gogoanime));
    let universal = Arc::new(FakeUniversal::new(Some(VideoData::default())));

    let mut registry = ProviderRegistry::new();
    registry.register(primary.clone());
    registry.set_universal(universal.clone());

    let store = Arc::new(InMemoryCacheStore::new(100));
    let service = service_with(registry, FakeSlugLookup::default(), store.clone());

    let video = service
        .resolve_video(
            &request(StreamProvider::Gogoanime, "one-piece-episode-1", 1, Subtype::Sub),
            false,
        )
        .await
        .unwrap();

    assert_eq!(video, None);
    assert_eq!(universal.call_count(), 1);
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_composite_provider_gets_slug_episode_id() {
    let hianime = Arc::new(
        FakeProvider::new(StreamProvider::HiAnime).with_sources(
            "one-piece-100?ep=1",
            Subtype::Sub,
            hls("https://hianime.example/1.m3u8"),
        ),
    );
    let mut registry = ProviderRegistry::new();
    registry.register(hianime.clone());

    let slugs = FakeSlugLookup::default().with("21", &[(StreamProvider::HiAnime, "one-piece-100")]);
    let service = service_with(registry, slugs, Arc::new(InMemoryCacheStore::new(100)));

    let video = service
        .resolve_video(&request(StreamProvider::HiAnime, "1", 1, Subtype::Sub), false)
        .await
        .unwrap();

    assert!(video.is_some());
    assert_eq!(
        hianime.source_calls.lock().unwrap()[0],
        ("one-piece-100?ep=1".to_string(), Subtype::Sub)
    );
}

#[tokio::test]
async fn test_force_refresh_bypasses_cached_sources() {
    let primary = Arc::new(FakeProvider::new(StreamProvider::Gogoanime).with_sources(
        "one-piece-episode-1",
        Subtype::Sub,
        hls("https://cdn.example/fresh.m3u8"),
    ));
    let mut registry = ProviderRegistry::new();
    registry.register(primary.clone());

    let store = Arc::new(InMemoryCacheStore::new(100));
    let service = service_with(registry, FakeSlugLookup::default(), store.clone());
    let request = request(StreamProvider::Gogoanime, "one-piece-episode-1", 1, Subtype::Sub);

    service.resolve_video(&request, false).await.unwrap();
    service.resolve_video(&request, false).await.unwrap();
    assert_eq!(primary.source_call_count(), 1);

    service.resolve_video(&request, true).await.unwrap();
    assert_eq!(primary.source_call_count(), 2);
    assert!(store.contains_key(&request.cache_key()));
}

#[tokio::test]
async fn test_unregistered_provider_is_client_error() {
    let service = service_with(
        ProviderRegistry::new(),
        FakeSlugLookup::default(),
        Arc::new(InMemoryCacheStore::new(100)),
    );

    let err = service
        .resolve_video(
            &request(StreamProvider::AnimePahe, "abc", 1, Subtype::Sub),
            false,
        )
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::InvalidInput(_)));
    assert!(err.is_client_error());
}
