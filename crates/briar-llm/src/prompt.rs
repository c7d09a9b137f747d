use briar_core::FeatureVector;

pub const SYSTEM_PROMPT: &str = "You are an expert bot detection system. \
You analyze behavioral telemetry statistics and answer with strict JSON only.";

fn yes_no(flag: bool, yes_label: &'static str, no_label: &'static str) -> &'static str {
    if flag {
        yes_label
    } else {
        no_label
    }
}

/// Builds the analysis prompt embedding the extracted features and the
/// scoring rubric. The rubric deliberately biases toward humans: fast but
/// legitimate users must not be flagged.
pub fn build_user_prompt(features: &FeatureVector) -> String {
    format!(
        "Analyze the following user behavior data and determine whether this is a \
legitimate human or an automated bot.\n\
\n\
IMPORTANT INSTRUCTIONS:\n\
- Be VERY GENEROUS to legitimate humans who fill forms quickly\n\
- Fast typing with high timing variance is NORMAL for skilled humans\n\
- Only flag as bot if there are CLEAR automation patterns\n\
- A trust score of 0.7-0.9 is expected for legitimate humans\n\
- Only give scores below 0.5 for obvious automation\n\
\n\
Behavior data:\n\
- Mouse movements: {}\n\
- Keystrokes: {}\n\
- Form fields: {}\n\
- Session duration: {}s\n\
- Total interactions: {}\n\
- Suspicious patterns detected: {}\n\
\n\
Derived metrics:\n\
- Mouse interval mean: {:.1}ms, variance: {:.2}\n\
- Mouse velocity mean: {:.3} px/ms, variance: {:.4} (higher variance = more human-like)\n\
- Mouse path linearity: {:.2} (near 1 = scripted straight lines)\n\
- Mouse curvature present: {}\n\
- Keystroke interval mean: {:.1}ms, variance: {:.2} (higher = more human-like)\n\
- Keystroke timing regularity: {:.2} (near 1 = scripted timing)\n\
- Natural typing pauses: {}\n\
- Behavior diversity: {:.2} (0-1, higher = harder to script)\n\
\n\
Respond with ONLY a valid JSON object, no markdown and no extra text:\n\
{{\n\
  \"trustScore\": <number between 0 and 1>,\n\
  \"trustLevel\": \"high\" | \"medium\" | \"low\" | \"suspicious\",\n\
  \"isBot\": true | false,\n\
  \"confidence\": <number between 0 and 1>,\n\
  \"reasoning\": \"<brief explanation>\",\n\
  \"keyFactors\": [\"<factor>\", ...]\n\
}}\n\
\n\
Remember: BE GENEROUS to fast but legitimate users.",
        features.mouse_movement_count,
        features.keystroke_count,
        features.form_field_count,
        (features.session_duration_ms / 1000.0).round(),
        features.interaction_count,
        features.suspicious_pattern_count,
        features.mouse_interval_mean,
        features.mouse_interval_variance,
        features.mouse_velocity_mean,
        features.mouse_velocity_variance,
        features.mouse_linearity_ratio,
        yes_no(features.has_mouse_curvature, "yes (human-like)", "no (bot-like)"),
        features.keystroke_interval_mean,
        features.keystroke_interval_variance,
        features.keystroke_regularity,
        yes_no(features.has_natural_pauses, "yes (human-like)", "no (bot-like)"),
        features.behavior_diversity,
    )
}
