use briar_core::{BriarError, BriarResult, FormField, SignalVerdict};
use std::collections::HashMap;

/// Scores field dwell time and completion speed. Browsing without forms
/// is normal, so absent form data is neutral rather than penalized.
pub fn analyze_form(fields: &HashMap<String, FormField>) -> BriarResult<SignalVerdict> {
    if fields.values().any(|f| {
        [f.focus_time, f.blur_time, f.dwell_time]
            .iter()
            .flatten()
            .any(|t| !t.is_finite())
    }) {
        return Err(BriarError::Score(
            "form field with non-finite timing".into(),
        ));
    }

    if fields.is_empty() {
        return Ok(SignalVerdict {
            human_score: 0.5,
            bot_score: 0.1,
            confidence: 0.5,
            reasons: vec!["No form interaction data".into()],
        });
    }

    let mut human_score: f64 = 0.7;
    let mut bot_score: f64 = 0.0;
    let mut reasons = Vec::new();

    let focused = fields.values().filter(|f| f.focus_time.is_some()).count();
    let total_changes: u32 = fields.values().map(|f| f.change_count).sum();

    if focused > 0 && total_changes > 0 {
        human_score += 0.2;
        reasons.push("Normal form interaction pattern".into());
    }

    let duration = form_duration(fields);
    if duration < 500.0 && total_changes > 3 {
        bot_score += 0.4;
        reasons.push("Extremely rapid form completion".into());
    } else if duration > 2000.0 {
        human_score += 0.1;
        reasons.push("Reasonable form completion time".into());
    }

    Ok(SignalVerdict {
        human_score: human_score.min(1.0),
        bot_score: bot_score.min(1.0),
        confidence: 0.7,
        reasons,
    })
}

/// Elapsed span from the earliest focus to the latest blur, falling back
/// to summed dwell times when blur events were not captured.
fn form_duration(fields: &HashMap<String, FormField>) -> f64 {
    let first_focus = fields
        .values()
        .filter_map(|f| f.focus_time)
        .fold(f64::INFINITY, f64::min);
    let last_blur = fields
        .values()
        .filter_map(|f| f.blur_time)
        .fold(f64::NEG_INFINITY, f64::max);

    if first_focus.is_finite() && last_blur.is_finite() && last_blur > first_focus {
        return last_blur - first_focus;
    }

    let dwell: f64 = fields.values().filter_map(|f| f.dwell_time).sum();
    if dwell > 0.0 {
        dwell
    } else {
        1000.0
    }
}
