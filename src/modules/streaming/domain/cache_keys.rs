//! Cache key layout for resolved results
//!
//! `episodes:{canonical}` and `stream:{provider}:{canonical}:{episode}:{subtype}`.
//! Identifier memo keys live with the identifier resolver.

use crate::modules::provider::domain::value_objects::{CanonicalAnimeId, StreamProvider, Subtype};

pub fn episodes_key(canonical_id: &CanonicalAnimeId) -> String {
    format!("episodes:{}", canonical_id)
}

pub fn stream_key(
    provider: StreamProvider,
    canonical_id: &CanonicalAnimeId,
    episode_id: &str,
    subtype: Subtype,
) -> String {
    format!("stream:{}:{}:{}:{}", provider, canonical_id, episode_id, subtype)
}
