use super::title_normalizer::TitleNormalizer;
use strsim::normalized_levenshtein;

/// Strategy for calculating similarity between two titles
///
/// Returns a value between 0.0 (completely different) and 1.0 (identical).
pub trait SimilarityStrategy: Send + Sync {
    fn calculate(&self, query: &str, target: &str) -> f64;

    fn name(&self) -> &'static str;
}

/// `1 - levenshtein / max(len)` over characters
#[derive(Debug, Clone)]
pub struct LevenshteinStrategy;

impl SimilarityStrategy for LevenshteinStrategy {
    fn calculate(&self, query: &str, target: &str) -> f64 {
        normalized_levenshtein(query, target)
    }

    fn name(&self) -> &'static str {
        "Levenshtein"
    }
}

/// Tiered title similarity
///
/// Exact match scores 1.0, equality after normalization 0.95, containment
/// either way 0.85; everything else falls through to the edit-distance
/// strategy on the normalized forms.
pub struct TieredTitleStrategy {
    normalizer: TitleNormalizer,
    fallback: Box<dyn SimilarityStrategy>,
}

impl TieredTitleStrategy {
    pub const EXACT: f64 = 1.0;
    pub const NORMALIZED_EXACT: f64 = 0.95;
    pub const CONTAINMENT: f64 = 0.85;

    pub fn new(normalizer: TitleNormalizer, fallback: Box<dyn SimilarityStrategy>) -> Self {
        Self {
            normalizer,
            fallback,
        }
    }
}

impl Default for TieredTitleStrategy {
    fn default() -> Self {
        Self::new(TitleNormalizer::standard(), Box::new(LevenshteinStrategy))
    }
}

impl SimilarityStrategy for TieredTitleStrategy {
    fn calculate(&self, query: &str, target: &str) -> f64 {
        if query.trim().is_empty() || target.trim().is_empty() {
            return 0.0;
        }
        if query == target {
            return Self::EXACT;
        }

        let query = self.normalizer.normalize(query);
        let target = self.normalizer.normalize(target);
        if query.is_empty() || target.is_empty() {
            return 0.0;
        }
        if query == target {
            return Self::NORMALIZED_EXACT;
        }
        if query.contains(&target) || target.contains(&query) {
            return Self::CONTAINMENT;
        }

        self.fallback.calculate(&query, &target)
    }

    fn name(&self) -> &'static str {
        "TieredTitle"
    }
}
