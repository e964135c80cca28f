use crate::shared::infrastructure::cache::Cacheable;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoSource {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality: Option<String>,
    pub is_hls: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubtitleTrack {
    pub url: String,
    pub language: String,
    pub kind: String,
    pub is_default: bool,
}

/// Intro/outro skip marker, in seconds from the start of the episode
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeRange {
    pub start_seconds: f64,
    pub end_seconds: f64,
}

impl TimeRange {
    /// Upstreams send `{start: 0, end: 0}` for "no marker"
    pub fn new_valid(start_seconds: f64, end_seconds: f64) -> Option<Self> {
        if end_seconds > start_seconds && start_seconds >= 0.0 {
            Some(Self {
                start_seconds,
                end_seconds,
            })
        } else {
            None
        }
    }
}

/// Playable result for one episode
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoData {
    pub sources: Vec<VideoSource>,
    #[serde(default)]
    pub tracks: Vec<SubtitleTrack>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intro: Option<TimeRange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outro: Option<TimeRange>,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

impl VideoData {
    /// A resolution without sources is a failure, whatever else it carries
    pub fn is_playable(&self) -> bool {
        self.sources.iter().any(|s| !s.url.trim().is_empty())
    }

    /// `Some(self)` only when playable
    pub fn into_playable(self) -> Option<Self> {
        self.is_playable().then_some(self)
    }
}

impl Cacheable for VideoData {
    fn is_cacheable(&self) -> bool {
        self.is_playable()
    }
}
