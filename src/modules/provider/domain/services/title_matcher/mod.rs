//! Fuzzy matching of provider search results against catalog facts
//!
//! Search-only providers are mapped by searching their catalog for the
//! canonical title and scoring every hit. The score is a weighted sum of
//! title similarity, format equality, release year proximity and a TV
//! bonus; only a best score strictly above the acceptance threshold maps.

pub mod config;
pub mod similarity_strategy;
pub mod title_normalizer;

pub use config::TitleMatchConfig;
pub use similarity_strategy::{LevenshteinStrategy, SimilarityStrategy, TieredTitleStrategy};
pub use title_normalizer::TitleNormalizer;

use crate::modules::provider::domain::entities::{AnimeInfo, SearchCandidate};
use std::cmp::Ordering;

/// What a search hit is scored against
#[derive(Debug, Clone, PartialEq)]
pub struct MatchTarget {
    pub title: String,
    /// Secondary title (usually English); the better of the two counts
    pub alt_title: Option<String>,
    pub year: Option<u32>,
    pub format: Option<String>,
}

impl MatchTarget {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            alt_title: None,
            year: None,
            format: None,
        }
    }

    pub fn with_year(mut self, year: u32) -> Self {
        self.year = Some(year);
        self
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }
}

impl From<&AnimeInfo> for MatchTarget {
    fn from(info: &AnimeInfo) -> Self {
        Self {
            title: info.title.clone(),
            alt_title: info.english_title.clone(),
            year: info.year,
            format: info.format.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCandidate {
    pub candidate: SearchCandidate,
    pub score: f64,
}

pub struct TitleMatcher {
    config: TitleMatchConfig,
    strategy: Box<dyn SimilarityStrategy>,
}

impl TitleMatcher {
    pub fn new(config: TitleMatchConfig) -> Self {
        Self::with_strategy(config, Box::new(TieredTitleStrategy::default()))
    }

    pub fn with_strategy(config: TitleMatchConfig, strategy: Box<dyn SimilarityStrategy>) -> Self {
        Self { config, strategy }
    }

    pub fn config(&self) -> &TitleMatchConfig {
        &self.config
    }

    /// Weighted score in `0.0..=1.0`
    pub fn score(&self, target: &MatchTarget, candidate: &SearchCandidate) -> f64 {
        let title_similarity = std::iter::once(target.title.as_str())
            .chain(target.alt_title.as_deref())
            .map(|title| self.strategy.calculate(title, &candidate.title))
            .fold(0.0_f64, f64::max);

        let format_score = match (&target.format, &candidate.format) {
            (Some(wanted), Some(found)) if wanted.trim().eq_ignore_ascii_case(found.trim()) => {
                self.config.format_weight
            }
            _ => 0.0,
        };

        let year_score = match (target.year, candidate.year) {
            (Some(wanted), Some(found)) => {
                let distance = wanted.abs_diff(found) as f64;
                let window = self.config.year_window.max(1) as f64;
                self.config.year_weight * (1.0 - distance / window).max(0.0)
            }
            _ => 0.0,
        };

        let tv_bonus = match &candidate.format {
            Some(format) if format.trim().eq_ignore_ascii_case("tv") => self.config.tv_bonus,
            _ => 0.0,
        };

        self.config.title_weight * title_similarity + format_score + year_score + tv_bonus
    }

    /// All candidates by descending score; ties keep the provider's order
    pub fn rank(&self, target: &MatchTarget, candidates: &[SearchCandidate]) -> Vec<ScoredCandidate> {
        let mut scored: Vec<ScoredCandidate> = candidates
            .iter()
            .map(|candidate| ScoredCandidate {
                score: self.score(target, candidate),
                candidate: candidate.clone(),
            })
            .collect();

        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        scored
    }

    /// Best candidate, if its score clears the acceptance threshold
    pub fn best_match(
        &self,
        target: &MatchTarget,
        candidates: &[SearchCandidate],
    ) -> Option<ScoredCandidate> {
        let best = self.rank(target, candidates).into_iter().next()?;

        if best.score > self.config.acceptance_threshold {
            log::debug!(
                "Title match: '{}' -> '{}' ({:.3})",
                target.title,
                best.candidate.title,
                best.score
            );
            Some(best)
        } else {
            log::debug!(
                "Title match: best candidate '{}' for '{}' scored {:.3}, below threshold {}",
                best.candidate.title,
                target.title,
                best.score,
                self.config.acceptance_threshold
            );
            None
        }
    }
}

impl Default for TitleMatcher {
    fn default() -> Self {
        Self::new(TitleMatchConfig::default())
    }
}
