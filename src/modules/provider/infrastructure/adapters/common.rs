//! Video source payload shared by the scraping APIs
//!
//! HiAnime, Consumet and Anify all answer "give me sources" with roughly the
//! same JSON, but disagree on naming: `url` or `file`, `tracks` or
//! `subtitles`, `lang`, `language` or `label`, `isM3U8` or `type: "hls"`.
//! Every variant is read into [`RawSourcesPayload`] and normalized once.

use crate::modules::provider::domain::entities::{
    SubtitleTrack, TimeRange, VideoData, VideoSource,
};
use crate::modules::provider::domain::value_objects::Subtype;
use crate::shared::utils::serde_helpers::{
    lenient_bool, lenient_opt_f64, lenient_opt_string, lenient_vec, value_to_string,
};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSource {
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub url: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub file: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub quality: Option<String>,
    #[serde(default, rename = "isM3U8", deserialize_with = "lenient_bool")]
    pub is_m3u8: bool,
    #[serde(default, rename = "type", deserialize_with = "lenient_opt_string")]
    pub source_type: Option<String>,
    /// AnimePahe mixes sub and dub links in one list
    #[serde(default, rename = "isDub")]
    pub is_dub: Option<bool>,
}

impl RawSource {
    fn into_video_source(self) -> Option<VideoSource> {
        let url = self.url.or(self.file)?;
        let is_hls = self.is_m3u8
            || self
                .source_type
                .as_deref()
                .is_some_and(|t| t.eq_ignore_ascii_case("hls"))
            || url.contains(".m3u8");

        Some(VideoSource {
            url,
            quality: self.quality,
            is_hls,
            source_type: self.source_type,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawTrack {
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub url: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub file: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub lang: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub language: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub label: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub default: bool,
}

impl RawTrack {
    fn into_subtitle_track(self) -> Option<SubtitleTrack> {
        let url = self.url.or(self.file)?;
        let language = self
            .lang
            .or(self.language)
            .or(self.label)
            .unwrap_or_else(|| "Unknown".to_string());

        Some(SubtitleTrack {
            url,
            language,
            kind: self.kind.unwrap_or_else(|| "captions".to_string()),
            is_default: self.default,
        })
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct RawRange {
    #[serde(default, deserialize_with = "lenient_opt_f64")]
    pub start: Option<f64>,
    #[serde(default, deserialize_with = "lenient_opt_f64")]
    pub end: Option<f64>,
}

impl RawRange {
    fn into_time_range(self) -> Option<TimeRange> {
        TimeRange::new_valid(self.start?, self.end?)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSourcesPayload {
    #[serde(default, deserialize_with = "lenient_vec")]
    pub sources: Vec<RawSource>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub tracks: Vec<RawTrack>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub subtitles: Vec<RawTrack>,
    #[serde(default)]
    pub intro: Option<Value>,
    #[serde(default)]
    pub outro: Option<Value>,
    #[serde(default)]
    pub headers: Option<Value>,
}

impl RawSourcesPayload {
    /// Keep only links for `subtype` when the upstream labels them, falling
    /// back to everything when none match
    pub fn retain_subtype(&mut self, subtype: Subtype) {
        let wanted_dub = subtype == Subtype::Dub;
        if self.sources.iter().all(|s| s.is_dub.is_none()) {
            return;
        }

        let matching: Vec<RawSource> = self
            .sources
            .iter()
            .filter(|s| s.is_dub == Some(wanted_dub))
            .cloned()
            .collect();
        if !matching.is_empty() {
            self.sources = matching;
        }
    }

    pub fn into_video_data(self) -> VideoData {
        let sources = self
            .sources
            .into_iter()
            .filter_map(RawSource::into_video_source)
            .collect();

        let tracks = self
            .tracks
            .into_iter()
            .chain(self.subtitles)
            .filter_map(RawTrack::into_subtitle_track)
            .collect();

        VideoData {
            sources,
            tracks,
            intro: parse_range(self.intro),
            outro: parse_range(self.outro),
            headers: parse_headers(self.headers),
        }
    }
}

fn parse_range(value: Option<Value>) -> Option<TimeRange> {
    let range: RawRange = serde_json::from_value(value?).ok()?;
    range.into_time_range()
}

fn parse_headers(value: Option<Value>) -> BTreeMap<String, String> {
    match value {
        Some(Value::Object(map)) => map
            .into_iter()
            .filter_map(|(name, value)| value_to_string(&value).map(|v| (name, v)))
            .collect(),
        _ => BTreeMap::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_hianime_shape() {
        let payload: RawSourcesPayload = serde_json::from_value(json!({
            "headers": {"Referer": "https://megacloud.tv/"},
            "sources": [{"url": "https://cdn/master.m3u8", "type": "hls"}],
            "tracks": [
                {"file": "https://cdn/eng.vtt", "label": "English", "kind": "captions", "default": true},
                {"url": "https://cdn/thumbs.vtt", "lang": "thumbnails"}
            ],
            "intro": {"start": 31, "end": 110},
            "outro": {"start": 0, "end": 0}
        }))
        .unwrap();

        let video = payload.into_video_data();
        assert_eq!(video.sources.len(), 1);
        assert!(video.sources[0].is_hls);
        assert_eq!(video.tracks.len(), 2);
        assert_eq!(video.tracks[0].language, "English");
        assert!(video.tracks[0].is_default);
        assert_eq!(video.tracks[1].kind, "captions");
        assert_eq!(
            video.intro,
            Some(TimeRange {
                start_seconds: 31.0,
                end_seconds: 110.0
            })
        );
        assert_eq!(video.outro, None);
        assert_eq!(video.headers.get("Referer").unwrap(), "https://megacloud.tv/");
    }

    #[test]
    fn test_consumet_shape() {
        let payload: RawSourcesPayload = serde_json::from_value(json!({
            "headers": {"Referer": "https://gogo/"},
            "sources": [
                {"url": "https://cdn/360.m3u8", "isM3U8": true, "quality": "360p"},
                {"url": "https://cdn/backup.mp4", "isM3U8": false, "quality": "backup"}
            ],
            "subtitles": [{"url": "https://cdn/en.vtt", "lang": "English"}],
            "download": "https://gogo/download"
        }))
        .unwrap();

        let video = payload.into_video_data();
        assert_eq!(video.sources.len(), 2);
        assert!(video.sources[0].is_hls);
        assert!(!video.sources[1].is_hls);
        assert_eq!(video.sources[0].quality.as_deref(), Some("360p"));
        assert_eq!(video.tracks.len(), 1);
    }

    #[test]
    fn test_nulls_and_junk_degrade_to_empty() {
        let payload: RawSourcesPayload = serde_json::from_value(json!({
            "sources": null,
            "tracks": [null, 5, {"lang": "no url"}],
            "intro": "soon",
            "headers": ["not", "a", "map"]
        }))
        .unwrap();

        let video = payload.into_video_data();
        assert!(video.sources.is_empty());
        assert!(video.tracks.is_empty());
        assert!(video.intro.is_none());
        assert!(video.headers.is_empty());
        assert!(!video.is_playable());
    }

    #[test]
    fn test_retain_subtype() {
        let mut payload: RawSourcesPayload = serde_json::from_value(json!({
            "sources": [
                {"url": "https://kwik/sub.m3u8", "isDub": false},
                {"url": "https://kwik/dub.m3u8", "isDub": true}
            ]
        }))
        .unwrap();

        payload.retain_subtype(Subtype::Dub);
        let video = payload.into_video_data();
        assert_eq!(video.sources.len(), 1);
        assert!(video.sources[0].url.contains("dub"));
    }
}
