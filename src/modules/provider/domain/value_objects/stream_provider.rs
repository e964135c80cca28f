use crate::shared::errors::AppError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Supported content providers
///
/// Dispatch always goes through this enum; a provider name that does not
/// parse is a client error, never a silent no-op.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StreamProvider {
    /// aniwatch-style HiAnime API (formerly Zoro). Episode ids are composite
    #[serde(rename = "hianime")]
    HiAnime,
    /// Gogoanime through Consumet. Dub listings live under a separate slug
    #[serde(rename = "gogoanime")]
    Gogoanime,
    /// AnimePahe through Consumet. Only reachable through title search
    #[serde(rename = "animepahe")]
    AnimePahe,
    /// Anify, keyed directly by canonical id; also the universal source fallback
    #[serde(rename = "anify")]
    Anify,
    /// Consumet AniList meta routes, keyed directly by canonical id
    #[serde(rename = "consumet")]
    Consumet,
}

impl StreamProvider {
    pub const ALL: [StreamProvider; 5] = [
        StreamProvider::HiAnime,
        StreamProvider::Gogoanime,
        StreamProvider::AnimePahe,
        StreamProvider::Anify,
        StreamProvider::Consumet,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StreamProvider::HiAnime => "hianime",
            StreamProvider::Gogoanime => "gogoanime",
            StreamProvider::AnimePahe => "animepahe",
            StreamProvider::Anify => "anify",
            StreamProvider::Consumet => "consumet",
        }
    }

    /// Map a MALSync site name onto a provider we can talk to
    pub fn from_malsync_site(site: &str) -> Option<Self> {
        match site.trim().to_ascii_lowercase().as_str() {
            "zoro" | "hianime" | "aniwatch" => Some(StreamProvider::HiAnime),
            "gogoanime" => Some(StreamProvider::Gogoanime),
            "animepahe" => Some(StreamProvider::AnimePahe),
            _ => None,
        }
    }

    /// Providers addressed by canonical id alone, without any slug lookup
    pub fn is_direct(&self) -> bool {
        matches!(self, StreamProvider::Anify | StreamProvider::Consumet)
    }
}

impl fmt::Display for StreamProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for StreamProvider {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hianime" | "zoro" | "aniwatch" => Ok(StreamProvider::HiAnime),
            "gogoanime" | "gogo" => Ok(StreamProvider::Gogoanime),
            "animepahe" | "pahe" => Ok(StreamProvider::AnimePahe),
            "anify" => Ok(StreamProvider::Anify),
            "consumet" => Ok(StreamProvider::Consumet),
            other => Err(AppError::InvalidInput(format!(
                "Unknown provider '{}'",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_through_str() {
        for provider in StreamProvider::ALL {
            assert_eq!(provider.as_str().parse::<StreamProvider>().unwrap(), provider);
        }
    }

    #[test]
    fn test_aliases_and_case() {
        assert_eq!("Zoro".parse::<StreamProvider>().unwrap(), StreamProvider::HiAnime);
        assert_eq!(" GOGOANIME ".parse::<StreamProvider>().unwrap(), StreamProvider::Gogoanime);
    }

    #[test]
    fn test_typo_is_rejected() {
        let err = "gogoanmie".parse::<StreamProvider>().unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }

    #[test]
    fn test_malsync_site_mapping() {
        assert_eq!(StreamProvider::from_malsync_site("Zoro"), Some(StreamProvider::HiAnime));
        assert_eq!(
            StreamProvider::from_malsync_site("Gogoanime"),
            Some(StreamProvider::Gogoanime)
        );
        assert_eq!(StreamProvider::from_malsync_site("Crunchyroll"), None);
    }

    #[test]
    fn test_serde_uses_lowercase_names() {
        let json = serde_json::to_string(&StreamProvider::AnimePahe).unwrap();
        assert_eq!(json, "\"animepahe\"");
    }
}
