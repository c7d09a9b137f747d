use crate::{form, keystroke, mouse, session};
use briar_core::{
    BehaviorSample, ScoreMetadata, ScoreResult, ScoringPolicy, SignalVerdict, TrustLevel,
};
use tracing::warn;

const MAX_REASONS: usize = 5;

// Fixed contributions when a single analyzer fails on malformed events.
// Mouse and keystroke faults lean slightly bot; form and session faults
// get the benefit of the doubt. No single failure can dominate the result.
const MOUSE_FAULT_BOT: f64 = 0.15;
const KEYSTROKE_FAULT_BOT: f64 = 0.10;
const FORM_FAULT_HUMAN: f64 = 0.15;
const SESSION_FAULT_HUMAN: f64 = 0.10;

/// Combines the four weighted signals into one trust score. Deterministic
/// and stateless: identical samples produce identical results, and no
/// input can make this return an error.
pub fn evaluate(sample: &BehaviorSample, policy: &ScoringPolicy) -> ScoreResult {
    let tracking = &sample.tracking_data;

    let mut human_factors = 0.0;
    let mut bot_factors = 0.0;
    let mut executed_weight = 0.0;
    let mut confidence = 0.0;
    let mut reasons: Vec<String> = Vec::new();

    let mut absorb = |verdict: Result<SignalVerdict, briar_core::BriarError>,
                      weight: f64,
                      channel: &str,
                      fault_human: f64,
                      fault_bot: f64| {
        match verdict {
            Ok(v) => {
                human_factors += v.human_score * weight;
                bot_factors += v.bot_score * weight;
                confidence += v.confidence * weight;
                executed_weight += weight;
                reasons.extend(v.reasons);
            }
            Err(e) => {
                warn!(channel = %channel, error = %e, "signal analyzer failed, absorbing");
                human_factors += fault_human;
                bot_factors += fault_bot;
            }
        }
    };

    absorb(
        mouse::analyze_mouse(&tracking.mouse_movements),
        policy.mouse_weight,
        "mouse",
        0.0,
        MOUSE_FAULT_BOT,
    );
    absorb(
        keystroke::analyze_keystrokes(&tracking.keystrokes),
        policy.keystroke_weight,
        "keystroke",
        0.0,
        KEYSTROKE_FAULT_BOT,
    );
    absorb(
        form::analyze_form(&tracking.form_interactions),
        policy.form_weight,
        "form",
        FORM_FAULT_HUMAN,
        0.0,
    );
    absorb(
        session::analyze_session(&tracking.session_metrics),
        policy.session_weight,
        "session",
        SESSION_FAULT_HUMAN,
        0.0,
    );

    let raw_score = human_factors.max(policy.baseline_floor);
    let penalty = bot_factors.min(policy.penalty_cap);
    let mut final_score = (raw_score - penalty * policy.penalty_damping).clamp(0.0, 1.0);

    if executed_weight < policy.min_data_quality {
        final_score *= policy.incomplete_data_factor;
    }

    if final_score > 0.4 && bot_factors < 0.4 {
        final_score = (final_score + policy.human_boost).min(policy.score_ceiling);
    }

    reasons.truncate(MAX_REASONS);

    ScoreResult {
        trust_score: final_score,
        trust_level: TrustLevel::from_score(final_score),
        needs_captcha: final_score <= policy.captcha_threshold,
        confidence: confidence.clamp(policy.min_confidence, 1.0),
        reasons,
        metadata: ScoreMetadata {
            human_factors,
            bot_factors,
            data_quality: executed_weight,
            session_duration: tracking.session_metrics.total_session_time,
            total_interactions: tracking.session_metrics.interaction_count,
            suspicious_pattern_count: tracking.session_metrics.suspicious_patterns.len(),
        },
    }
}
