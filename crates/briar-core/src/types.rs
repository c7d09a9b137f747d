use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One snapshot of accumulated client-side telemetry for a session.
/// Field names are camelCase on the wire because the collector is a
/// browser script.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BehaviorSample {
    pub user_id: String,
    #[serde(default)]
    pub tracking_data: TrackingData,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingData {
    #[serde(default)]
    pub mouse_movements: Vec<MouseEvent>,
    #[serde(default)]
    pub keystrokes: Vec<Keystroke>,
    #[serde(default)]
    pub form_interactions: HashMap<String, FormField>,
    #[serde(default)]
    pub session_metrics: SessionMetrics,
    #[serde(default)]
    pub scroll_events: Vec<serde_json::Value>,
    #[serde(default)]
    pub touch_events: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MouseEvent {
    pub x: f64,
    pub y: f64,
    pub timestamp: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Keystroke {
    #[serde(default)]
    pub key: String,
    pub timestamp: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormField {
    #[serde(default)]
    pub focus_time: Option<f64>,
    #[serde(default)]
    pub blur_time: Option<f64>,
    #[serde(default)]
    pub dwell_time: Option<f64>,
    #[serde(default)]
    pub change_count: u32,
    #[serde(default)]
    pub corrections: Option<u32>,
    #[serde(default)]
    pub hesitations: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionMetrics {
    #[serde(default)]
    pub total_session_time: f64,
    #[serde(default)]
    pub interaction_count: u64,
    #[serde(default)]
    pub suspicious_patterns: Vec<SuspiciousPattern>,
    #[serde(default)]
    pub focus_changes: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuspiciousPattern {
    #[serde(rename = "type")]
    pub kind: String,
}

/// Statistical descriptors derived from one sample. Computed fresh per
/// analysis call, never cached or persisted.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureVector {
    pub mouse_movement_count: usize,
    pub keystroke_count: usize,
    pub form_field_count: usize,
    pub session_duration_ms: f64,
    pub interaction_count: u64,
    pub suspicious_pattern_count: usize,

    pub mouse_interval_mean: f64,
    pub mouse_interval_variance: f64,
    pub mouse_velocity_mean: f64,
    pub mouse_velocity_variance: f64,
    pub mouse_linearity_ratio: f64,
    pub has_mouse_curvature: bool,

    pub keystroke_interval_mean: f64,
    pub keystroke_interval_variance: f64,
    pub keystroke_regularity: f64,
    pub has_natural_pauses: bool,

    pub behavior_diversity: f64,

    pub sparse_mouse_data: bool,
    pub sparse_keystroke_data: bool,
}

/// Partial verdict from one interaction channel.
#[derive(Debug, Clone)]
pub struct SignalVerdict {
    pub human_score: f64,
    pub bot_score: f64,
    pub confidence: f64,
    pub reasons: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrustLevel {
    High,
    MediumHigh,
    Medium,
    Low,
    VeryLow,
    BotSuspected,
}

impl TrustLevel {
    pub fn from_score(score: f64) -> Self {
        if score >= 0.75 {
            TrustLevel::High
        } else if score >= 0.60 {
            TrustLevel::MediumHigh
        } else if score >= 0.45 {
            TrustLevel::Medium
        } else if score >= 0.30 {
            TrustLevel::Low
        } else if score >= 0.15 {
            TrustLevel::VeryLow
        } else {
            TrustLevel::BotSuspected
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TrustLevel::High => "high",
            TrustLevel::MediumHigh => "medium_high",
            TrustLevel::Medium => "medium",
            TrustLevel::Low => "low",
            TrustLevel::VeryLow => "very_low",
            TrustLevel::BotSuspected => "bot_suspected",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreMetadata {
    pub human_factors: f64,
    pub bot_factors: f64,
    pub data_quality: f64,
    pub session_duration: f64,
    pub total_interactions: u64,
    pub suspicious_pattern_count: usize,
}

/// The envelope every analyzer and adapter must produce. Constructed once
/// per analysis call and handed straight to the caller.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreResult {
    pub trust_score: f64,
    pub trust_level: TrustLevel,
    pub needs_captcha: bool,
    pub confidence: f64,
    pub reasons: Vec<String>,
    pub metadata: ScoreMetadata,
}

/// Which path produced a result, for observability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisMethod {
    Llm(String),
    RuleBasedFallback,
}

impl AnalysisMethod {
    pub fn as_tag(&self) -> String {
        match self {
            AnalysisMethod::Llm(provider) => provider.clone(),
            AnalysisMethod::RuleBasedFallback => "rule_based_fallback".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trust_levels_cover_full_range() {
        assert_eq!(TrustLevel::from_score(0.80), TrustLevel::High);
        assert_eq!(TrustLevel::from_score(0.75), TrustLevel::High);
        assert_eq!(TrustLevel::from_score(0.65), TrustLevel::MediumHigh);
        assert_eq!(TrustLevel::from_score(0.50), TrustLevel::Medium);
        assert_eq!(TrustLevel::from_score(0.35), TrustLevel::Low);
        assert_eq!(TrustLevel::from_score(0.20), TrustLevel::VeryLow);
        assert_eq!(TrustLevel::from_score(0.05), TrustLevel::BotSuspected);
    }

    #[test]
    fn sample_deserializes_with_missing_subobjects() {
        let sample: BehaviorSample =
            serde_json::from_str(r#"{"userId":"u1","trackingData":{}}"#).unwrap();
        assert_eq!(sample.user_id, "u1");
        assert!(sample.tracking_data.mouse_movements.is_empty());
        assert!(sample.tracking_data.form_interactions.is_empty());
        assert_eq!(sample.tracking_data.session_metrics.interaction_count, 0);
    }

    #[test]
    fn sample_deserializes_collector_payload() {
        let raw = r#"{
            "userId": "session-42",
            "trackingData": {
                "mouseMovements": [{"x": 10.0, "y": 20.0, "timestamp": 1000}],
                "keystrokes": [{"key": "a", "timestamp": 1200}],
                "formInteractions": {
                    "email": {"focusTime": 1000, "blurTime": 4000, "changeCount": 12}
                },
                "sessionMetrics": {
                    "totalSessionTime": 45000,
                    "interactionCount": 37,
                    "suspiciousPatterns": [{"type": "devtools_open"}]
                }
            }
        }"#;
        let sample: BehaviorSample = serde_json::from_str(raw).unwrap();
        let td = &sample.tracking_data;
        assert_eq!(td.mouse_movements.len(), 1);
        assert_eq!(td.form_interactions["email"].change_count, 12);
        assert_eq!(td.session_metrics.suspicious_patterns[0].kind, "devtools_open");
    }
}
