use briar_core::{BriarError, BriarResult, SessionMetrics, SignalVerdict};

/// Scores interactions-per-second and absolute session duration.
pub fn analyze_session(metrics: &SessionMetrics) -> BriarResult<SignalVerdict> {
    if !metrics.total_session_time.is_finite() || metrics.total_session_time < 0.0 {
        return Err(BriarError::Score("invalid session duration".into()));
    }

    let mut human_score: f64 = 0.7;
    let mut bot_score: f64 = 0.0;
    let mut reasons = Vec::new();

    let seconds = (metrics.total_session_time / 1000.0).max(1.0);
    let rate = metrics.interaction_count as f64 / seconds;

    if rate > 20.0 {
        bot_score += 0.6;
        reasons.push("Inhuman interaction rate".into());
    } else if rate > 10.0 {
        bot_score += 0.3;
        reasons.push("High interaction rate".into());
    } else if rate > 0.5 && rate < 8.0 {
        human_score += 0.2;
        reasons.push("Normal interaction rate".into());
    } else if rate < 0.1 {
        bot_score += 0.2;
        reasons.push("Unusually low activity".into());
    }

    if metrics.total_session_time < 1000.0 {
        bot_score += 0.3;
        reasons.push("Extremely short session".into());
    } else if metrics.total_session_time > 3000.0 {
        human_score += 0.1;
        reasons.push("Reasonable session duration".into());
    }

    Ok(SignalVerdict {
        human_score: human_score.min(1.0),
        bot_score: bot_score.min(1.0),
        confidence: 0.8,
        reasons,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(duration_ms: f64, interactions: u64) -> SessionMetrics {
        SessionMetrics {
            total_session_time: duration_ms,
            interaction_count: interactions,
            suspicious_patterns: vec![],
            focus_changes: None,
        }
    }

    #[test]
    fn hammering_interaction_rate_is_flagged() {
        // 370 interactions over 3 seconds is above the 20/s ceiling.
        let verdict = analyze_session(&session(3000.0, 370)).unwrap();
        assert!(verdict.reasons.iter().any(|r| r.contains("Inhuman")));
        assert!(verdict.bot_score >= 0.6);
    }

    #[test]
    fn unhurried_session_reads_human() {
        let verdict = analyze_session(&session(45000.0, 90)).unwrap();
        assert_eq!(verdict.bot_score, 0.0);
        assert!(verdict.human_score >= 0.9);
    }

    #[test]
    fn sub_second_session_is_penalized() {
        let verdict = analyze_session(&session(400.0, 2)).unwrap();
        assert!(verdict
            .reasons
            .iter()
            .any(|r| r.contains("Extremely short session")));
    }

    #[test]
    fn idle_session_draws_a_small_penalty() {
        let verdict = analyze_session(&session(120_000.0, 5)).unwrap();
        assert!(verdict.reasons.iter().any(|r| r.contains("low activity")));
        assert!(verdict.bot_score > 0.0 && verdict.bot_score <= 0.2);
    }

    #[test]
    fn negative_duration_is_an_error() {
        assert!(analyze_session(&session(-5.0, 1)).is_err());
    }
}
