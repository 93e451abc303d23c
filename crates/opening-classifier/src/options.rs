use serde::Deserialize;

use crate::scorer::ScoreOrder;

/// Plies reported in the per-ply progression when no limit is given.
pub const DEFAULT_REPORT_LIMIT: usize = 20;

/// Per-query classification options.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ClassifyOptions {
    /// Report "no match" instead of falling back to sequence/pattern matching
    /// when no played position is in the catalogue.
    pub require_exact_position_match: bool,
    /// Admit entries whose moves were played in a different order.
    pub orderless_matching: bool,
    pub orderless_threshold: f64,
    /// Rank set-matched entries above everything else.
    pub prefer_set_matches: bool,
    pub report_limit: Option<usize>,
    pub include_diagnostics: bool,
}

impl Default for ClassifyOptions {
    fn default() -> Self {
        Self {
            require_exact_position_match: false,
            orderless_matching: false,
            orderless_threshold: 1.0,
            prefer_set_matches: false,
            report_limit: None,
            include_diagnostics: false,
        }
    }
}

impl ClassifyOptions {
    /// Set-match threshold clamped to `[0, 1]`; NaN falls back to exact superset.
    pub fn threshold(&self) -> f64 {
        if self.orderless_threshold.is_nan() {
            1.0
        } else {
            self.orderless_threshold.clamp(0.0, 1.0)
        }
    }

    pub fn score_order(&self) -> ScoreOrder {
        if self.prefer_set_matches {
            ScoreOrder::PreferSetMatch
        } else {
            ScoreOrder::Default
        }
    }

    pub fn report_limit(&self) -> usize {
        self.report_limit.unwrap_or(DEFAULT_REPORT_LIMIT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_clamped() {
        let mut options = ClassifyOptions::default();
        assert_eq!(options.threshold(), 1.0);

        options.orderless_threshold = 1.7;
        assert_eq!(options.threshold(), 1.0);
        options.orderless_threshold = -0.2;
        assert_eq!(options.threshold(), 0.0);
        options.orderless_threshold = f64::NAN;
        assert_eq!(options.threshold(), 1.0);
    }

    #[test]
    fn test_deserialize_partial() {
        let options: ClassifyOptions =
            serde_json::from_str(r#"{"orderless_matching": true, "report_limit": 6}"#).unwrap();
        assert!(options.orderless_matching);
        assert_eq!(options.report_limit(), 6);
        assert_eq!(options.orderless_threshold, 1.0);
        assert_eq!(options.score_order(), ScoreOrder::Default);
    }
}
