pub mod cache_keys;
pub mod episode_merger;
pub mod ttl_policy;

pub use episode_merger::EpisodeMerger;
pub use ttl_policy::TtlPolicy;
