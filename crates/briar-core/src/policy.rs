use serde::Deserialize;

/// Tunable weights and thresholds for the rule-based scorer. The defaults
/// are the balanced calibration; strictness is adjusted through config,
/// not code.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScoringPolicy {
    pub mouse_weight: f64,
    pub keystroke_weight: f64,
    pub form_weight: f64,
    pub session_weight: f64,

    /// Minimum raw score before penalties; strong human signals are never
    /// docked below parity.
    pub baseline_floor: f64,
    /// Maximum total bot penalty; one extreme signal cannot zero out an
    /// otherwise plausible session.
    pub penalty_cap: f64,
    /// Penalty multiplier applied after capping.
    pub penalty_damping: f64,
    /// Applied when less than this fraction of analyzer weight executed.
    pub min_data_quality: f64,
    pub incomplete_data_factor: f64,
    /// Human-confidence boost and the hard ceiling on any automated score.
    pub human_boost: f64,
    pub score_ceiling: f64,

    pub captcha_threshold: f64,
    pub min_confidence: f64,

    /// Floor applied to any LLM verdict, keeping the two paths
    /// policy-consistent.
    pub llm_score_floor: f64,
    pub llm_captcha_threshold: f64,

    /// Stored trust is raised to at least this value after a completed
    /// CAPTCHA; the score itself is recomputed on the next sample.
    pub captcha_success_floor: f64,
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self {
            mouse_weight: 0.30,
            keystroke_weight: 0.30,
            form_weight: 0.25,
            session_weight: 0.15,
            baseline_floor: 0.5,
            penalty_cap: 0.6,
            penalty_damping: 0.7,
            min_data_quality: 0.8,
            incomplete_data_factor: 0.85,
            human_boost: 0.15,
            score_ceiling: 0.95,
            captcha_threshold: 0.45,
            min_confidence: 0.4,
            llm_score_floor: 0.35,
            llm_captcha_threshold: 0.5,
            captcha_success_floor: 0.8,
        }
    }
}

impl ScoringPolicy {
    pub fn total_weight(&self) -> f64 {
        self.mouse_weight + self.keystroke_weight + self.form_weight + self.session_weight
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_weights_sum_to_one() {
        let policy = ScoringPolicy::default();
        assert!((policy.total_weight() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn partial_config_fills_defaults() {
        let policy: ScoringPolicy = toml::from_str("captcha_threshold = 0.6").unwrap();
        assert_eq!(policy.captcha_threshold, 0.6);
        assert_eq!(policy.mouse_weight, 0.30);
        assert_eq!(policy.llm_score_floor, 0.35);
    }
}
