use crate::features::{self, MIN_KEYSTROKES};
use briar_core::{BriarError, BriarResult, Keystroke, SignalVerdict};

/// Scores keystroke timing rhythm.
pub fn analyze_keystrokes(keystrokes: &[Keystroke]) -> BriarResult<SignalVerdict> {
    if keystrokes.iter().any(|k| !k.timestamp.is_finite()) {
        return Err(BriarError::Score(
            "keystroke with non-finite timestamp".into(),
        ));
    }

    if keystrokes.len() < MIN_KEYSTROKES {
        return Ok(SignalVerdict {
            human_score: 0.6,
            bot_score: 0.1,
            confidence: 0.6,
            reasons: vec!["Limited keystroke data - acceptable".into()],
        });
    }

    let mut human_score: f64 = 0.7;
    let mut bot_score: f64 = 0.0;
    let mut reasons = Vec::new();

    let intervals = features::intervals(keystrokes.iter().map(|k| k.timestamp));
    if intervals.len() > 2 {
        let (mean, variance) = features::mean_variance(&intervals);

        if mean < 20.0 {
            bot_score += 0.6;
            reasons.push("Inhuman typing speed".into());
        } else if mean > 100.0 && mean < 800.0 {
            human_score += 0.2;
            reasons.push("Human-like typing rhythm".into());
        }

        if variance < 10.0 && intervals.len() > 5 {
            bot_score += 0.3;
            reasons.push("Too consistent typing rhythm".into());
        } else if variance > 50.0 {
            human_score += 0.1;
            reasons.push("Natural typing variance".into());
        }
    }

    Ok(SignalVerdict {
        human_score: human_score.min(1.0),
        bot_score: bot_score.min(1.0),
        confidence: 0.7,
        reasons,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn typed_at(times: &[f64]) -> Vec<Keystroke> {
        times
            .iter()
            .map(|&timestamp| Keystroke {
                key: "a".into(),
                timestamp,
            })
            .collect()
    }

    fn metronome(count: usize, spacing_ms: f64) -> Vec<Keystroke> {
        (0..count)
            .map(|i| Keystroke {
                key: "a".into(),
                timestamp: i as f64 * spacing_ms,
            })
            .collect()
    }

    #[test]
    fn two_keystrokes_get_generous_default() {
        let verdict = analyze_keystrokes(&typed_at(&[0.0, 150.0])).unwrap();
        assert_eq!(verdict.human_score, 0.6);
        assert_eq!(verdict.bot_score, 0.1);
    }

    #[test]
    fn ten_ms_metronome_typing_is_flagged() {
        let verdict = analyze_keystrokes(&metronome(50, 10.0)).unwrap();
        assert!(verdict.reasons.iter().any(|r| r.contains("Inhuman typing")));
        assert!(verdict.bot_score > 0.85);
    }

    #[test]
    fn varied_human_typing_scores_high() {
        let verdict =
            analyze_keystrokes(&typed_at(&[0.0, 180.0, 310.0, 620.0, 750.0, 1100.0, 1230.0]))
                .unwrap();
        assert!(verdict.human_score >= 0.9);
        assert_eq!(verdict.bot_score, 0.0);
    }

    #[test]
    fn slow_metronome_still_penalized_for_consistency() {
        let verdict = analyze_keystrokes(&metronome(20, 150.0)).unwrap();
        assert!(verdict
            .reasons
            .iter()
            .any(|r| r.contains("Too consistent typing")));
    }
}
