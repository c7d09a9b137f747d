use crate::features::{self, MIN_MOUSE_EVENTS};
use briar_core::{BriarError, BriarResult, MouseEvent, SignalVerdict};

const LINEARITY_EPSILON: f64 = 0.01;

/// Scores mouse movement timing and trajectory. Starts from the
/// human-friendly baseline; bot penalties must be earned by clearly
/// anomalous statistics.
pub fn analyze_mouse(movements: &[MouseEvent]) -> BriarResult<SignalVerdict> {
    if movements
        .iter()
        .any(|m| !m.x.is_finite() || !m.y.is_finite() || !m.timestamp.is_finite())
    {
        return Err(BriarError::Score(
            "mouse event with non-finite coordinate or timestamp".into(),
        ));
    }

    if movements.len() < MIN_MOUSE_EVENTS {
        // Absence of data is not evidence of bot behavior.
        return Ok(SignalVerdict {
            human_score: 0.6,
            bot_score: 0.2,
            confidence: 0.6,
            reasons: vec!["Limited mouse data - acceptable".into()],
        });
    }

    let mut human_score: f64 = 0.7;
    let mut bot_score: f64 = 0.0;
    let mut reasons = Vec::new();

    let intervals = features::intervals(movements.iter().map(|m| m.timestamp));
    if intervals.len() > 3 {
        let (mean, variance) = features::mean_variance(&intervals);

        if mean < 5.0 {
            bot_score += 0.8;
            reasons.push("Inhuman mouse speed detected".into());
        } else if mean < 25.0 {
            bot_score += 0.4;
            reasons.push("Very fast mouse movement".into());
        } else if mean > 50.0 && mean < 500.0 {
            human_score += 0.2;
            reasons.push("Human-like mouse timing".into());
        }

        if variance < 5.0 {
            bot_score += 0.6;
            reasons.push("Too consistent mouse timing".into());
        } else if variance < 15.0 {
            bot_score += 0.3;
            reasons.push("Somewhat consistent mouse timing".into());
        } else if variance > 20.0 {
            human_score += 0.1;
            reasons.push("Natural mouse variance".into());
        }
    }

    if movements.len() >= 8 {
        let linearity = features::linearity_ratio(movements, LINEARITY_EPSILON);
        if linearity > 0.6 {
            bot_score += 0.5;
            reasons.push("Too linear mouse movement".into());
        } else if linearity > 0.4 {
            bot_score += 0.2;
            reasons.push("Somewhat linear mouse movement".into());
        } else {
            human_score += 0.1;
            reasons.push("Natural mouse curves".into());
        }
    }

    Ok(SignalVerdict {
        human_score: human_score.min(1.0),
        bot_score: bot_score.min(1.0),
        confidence: 0.8,
        reasons,
    })
}
