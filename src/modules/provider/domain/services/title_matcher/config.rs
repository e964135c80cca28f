/// Weights and threshold for search candidate scoring
///
/// All hand-tuned numbers of the matcher live here.
#[derive(Debug, Clone)]
pub struct TitleMatchConfig {
    /// Share of the score driven by title similarity
    pub title_weight: f64,
    /// Awarded when the catalog and candidate formats match exactly
    pub format_weight: f64,
    /// Maximum share awarded for release year proximity
    pub year_weight: f64,
    /// Year difference at which the year share reaches zero
    pub year_window: u32,
    /// Fixed bonus for the long-running TV format
    pub tv_bonus: f64,
    /// Best score must be strictly greater than this to be accepted
    pub acceptance_threshold: f64,
}

impl TitleMatchConfig {
    pub fn new() -> Self {
        Self {
            title_weight: 0.70,
            format_weight: 0.15,
            year_weight: 0.10,
            year_window: 10,
            tv_bonus: 0.05,
            acceptance_threshold: 0.6,
        }
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.acceptance_threshold = threshold;
        self
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<(), String> {
        let weight_sum = self.title_weight + self.format_weight + self.year_weight + self.tv_bonus;
        if (weight_sum - 1.0).abs() > 0.01 {
            return Err(format!("Match weights must sum to 1.0, got {}", weight_sum));
        }

        if [
            self.title_weight,
            self.format_weight,
            self.year_weight,
            self.tv_bonus,
        ]
        .iter()
        .any(|w| *w < 0.0)
        {
            return Err("Match weights must be non-negative".to_string());
        }

        if self.year_window == 0 {
            return Err("year_window must be > 0".to_string());
        }

        if !(0.0..=1.0).contains(&self.acceptance_threshold) {
            return Err(format!(
                "Acceptance threshold must be within 0.0..=1.0, got {}",
                self.acceptance_threshold
            ));
        }

        Ok(())
    }
}

impl Default for TitleMatchConfig {
    fn default() -> Self {
        Self::new()
    }
}
