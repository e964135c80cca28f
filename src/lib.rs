//! Anime streaming identifier resolution and provider aggregation
//!
//! [`StreamingService`] resolves a canonical (AniList) anime id into episode
//! listings per content provider and into playable video sources, caching
//! results with per-kind TTLs.

pub mod modules;
pub mod shared;

pub use modules::provider::{CanonicalAnimeId, StreamProvider, Subtype};
pub use modules::streaming::{EpisodesResponse, StreamingService, VideoRequest};
pub use shared::{AppError, AppResult, EngineConfig};
