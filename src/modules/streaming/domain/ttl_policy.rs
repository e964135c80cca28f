use crate::shared::config::EngineConfig;
use std::time::Duration;

/// How long each kind of resolved result stays cached
///
/// Video links are signed and expire upstream after roughly half an hour;
/// episode lists of finished shows practically never change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TtlPolicy {
    pub video: Duration,
    pub airing_episodes: Duration,
    pub finished_episodes: Duration,
    pub identifier: Duration,
}

impl TtlPolicy {
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            video: config.video_ttl,
            airing_episodes: config.airing_episodes_ttl,
            finished_episodes: config.finished_episodes_ttl,
            identifier: config.identifier_ttl,
        }
    }

    pub fn episodes(&self, is_airing: bool) -> Duration {
        if is_airing {
            self.airing_episodes
        } else {
            self.finished_episodes
        }
    }
}

impl Default for TtlPolicy {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
    }
}
