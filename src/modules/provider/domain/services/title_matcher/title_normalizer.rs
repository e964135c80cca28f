/// Transformation that can be applied to a title
pub trait TitleTransformation: Send + Sync {
    fn transform(&self, title: &str) -> String;
    fn name(&self) -> &'static str;
}

#[derive(Debug, Clone)]
pub struct LowercaseTransform;

impl TitleTransformation for LowercaseTransform {
    fn transform(&self, title: &str) -> String {
        title.to_lowercase()
    }

    fn name(&self) -> &'static str {
        "Lowercase"
    }
}

/// Turns punctuation into word breaks, keeping only alphanumerics and whitespace
///
/// Replacing with a space (rather than deleting) keeps `Re:Zero` and
/// `Re Zero` equal after whitespace normalization.
#[derive(Debug, Clone)]
pub struct PunctuationToSpaceTransform;

impl TitleTransformation for PunctuationToSpaceTransform {
    fn transform(&self, title: &str) -> String {
        title
            .chars()
            .map(|c| {
                if c.is_alphanumeric() || c.is_whitespace() {
                    c
                } else {
                    ' '
                }
            })
            .collect()
    }

    fn name(&self) -> &'static str {
        "PunctuationToSpace"
    }
}

/// Drops a trailing `(Dub)` / `(Sub)` marker that provider catalogs append
/// to the title of a subtype-specific listing
#[derive(Debug, Clone)]
pub struct SubtypeMarkerTransform;

impl TitleTransformation for SubtypeMarkerTransform {
    fn transform(&self, title: &str) -> String {
        let trimmed = title.trim_end();
        for marker in ["(dub)", "(sub)"] {
            let Some(split) = trimmed.len().checked_sub(marker.len()) else {
                continue;
            };
            if trimmed.is_char_boundary(split) && trimmed[split..].eq_ignore_ascii_case(marker) {
                return trimmed[..split].to_string();
            }
        }
        title.to_string()
    }

    fn name(&self) -> &'static str {
        "SubtypeMarker"
    }
}

/// Collapses runs of whitespace and trims
#[derive(Debug, Clone)]
pub struct NormalizeWhitespaceTransform;

impl TitleTransformation for NormalizeWhitespaceTransform {
    fn transform(&self, title: &str) -> String {
        title.split_whitespace().collect::<Vec<&str>>().join(" ")
    }

    fn name(&self) -> &'static str {
        "NormalizeWhitespace"
    }
}

/// Title normalizer that applies a pipeline of transformations
pub struct TitleNormalizer {
    transformations: Vec<Box<dyn TitleTransformation>>,
}

impl TitleNormalizer {
    pub fn new() -> Self {
        Self {
            transformations: Vec::new(),
        }
    }

    /// Case, punctuation and whitespace insensitive comparison form
    pub fn standard() -> Self {
        Self::new()
            .with_subtype_marker_removed()
            .with_lowercase()
            .with_punctuation_to_space()
            .with_normalize_whitespace()
    }

    pub fn with_subtype_marker_removed(mut self) -> Self {
        self.transformations.push(Box::new(SubtypeMarkerTransform));
        self
    }

    pub fn with_lowercase(mut self) -> Self {
        self.transformations.push(Box::new(LowercaseTransform));
        self
    }

    pub fn with_punctuation_to_space(mut self) -> Self {
        self.transformations
            .push(Box::new(PunctuationToSpaceTransform));
        self
    }

    pub fn with_normalize_whitespace(mut self) -> Self {
        self.transformations
            .push(Box::new(NormalizeWhitespaceTransform));
        self
    }

    pub fn normalize(&self, title: &str) -> String {
        let mut result = title.to_string();

        for transformation in &self.transformations {
            result = transformation.transform(&result);
            log::trace!("After {}: '{}'", transformation.name(), result);
        }

        result
    }

    pub fn transformation_count(&self) -> usize {
        self.transformations.len()
    }
}

impl Default for TitleNormalizer {
    fn default() -> Self {
        Self::standard()
    }
}
