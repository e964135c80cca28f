pub mod anime_info;
pub mod episode;
pub mod provider_identifier;
pub mod video;

pub use anime_info::{AnimeInfo, EpisodeMeta, SearchCandidate};
pub use episode::{EpisodeRecord, EpisodeTarget, EpisodesShape, ProviderEpisodeSet};
pub use provider_identifier::{ProviderIdentifier, ResolvedVia, SiteSlugs};
pub use video::{SubtitleTrack, TimeRange, VideoData, VideoSource};
