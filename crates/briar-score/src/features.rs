use briar_core::{FeatureVector, Keystroke, MouseEvent, TrackingData};

pub(crate) const MIN_MOUSE_EVENTS: usize = 5;
pub(crate) const MIN_KEYSTROKES: usize = 3;

/// Slope change below this counts a movement triple as collinear.
const LINEARITY_EPSILON: f64 = 0.01;
/// Slope change above this counts a triple as curved.
const CURVATURE_THRESHOLD: f64 = 0.1;
const NATURAL_PAUSE_MS: f64 = 200.0;

// Neutral mid-range defaults for sparse channels. Zero would read as
// maximally bot-like, which absence of data does not support.
const NEUTRAL_INTERVAL_MEAN: f64 = 120.0;
const NEUTRAL_INTERVAL_VARIANCE: f64 = 30.0;
const NEUTRAL_VELOCITY_MEAN: f64 = 0.5;
const NEUTRAL_VELOCITY_VARIANCE: f64 = 0.1;
const NEUTRAL_LINEARITY: f64 = 0.2;
const NEUTRAL_REGULARITY: f64 = 0.3;

/// Derives statistical descriptors from raw interaction arrays. Pure and
/// infallible: sparse channels get flagged and filled with neutral values.
pub fn extract_features(tracking: &TrackingData) -> FeatureVector {
    let mouse = &tracking.mouse_movements;
    let keys = &tracking.keystrokes;

    let sparse_mouse = mouse.len() < MIN_MOUSE_EVENTS;
    let sparse_keys = keys.len() < MIN_KEYSTROKES;

    let mouse_intervals = intervals(mouse.iter().map(|m| m.timestamp));
    let key_intervals = intervals(keys.iter().map(|k| k.timestamp));

    let (mouse_mean, mouse_var) = if sparse_mouse {
        (NEUTRAL_INTERVAL_MEAN, NEUTRAL_INTERVAL_VARIANCE)
    } else {
        mean_variance(&mouse_intervals)
    };

    let (key_mean, key_var) = if sparse_keys {
        (NEUTRAL_INTERVAL_MEAN, NEUTRAL_INTERVAL_VARIANCE)
    } else {
        mean_variance(&key_intervals)
    };

    let velocities = mouse_velocities(mouse);
    let (vel_mean, vel_var) = if velocities.is_empty() {
        (NEUTRAL_VELOCITY_MEAN, NEUTRAL_VELOCITY_VARIANCE)
    } else {
        mean_variance(&velocities)
    };

    let linearity = if sparse_mouse {
        NEUTRAL_LINEARITY
    } else {
        linearity_ratio(mouse, LINEARITY_EPSILON)
    };

    let regularity = if sparse_keys {
        NEUTRAL_REGULARITY
    } else {
        timing_regularity(&key_intervals)
    };

    FeatureVector {
        mouse_movement_count: mouse.len(),
        keystroke_count: keys.len(),
        form_field_count: tracking.form_interactions.len(),
        session_duration_ms: tracking.session_metrics.total_session_time.max(0.0),
        interaction_count: tracking.session_metrics.interaction_count,
        suspicious_pattern_count: tracking.session_metrics.suspicious_patterns.len(),
        mouse_interval_mean: mouse_mean,
        mouse_interval_variance: mouse_var,
        mouse_velocity_mean: vel_mean,
        mouse_velocity_variance: vel_var,
        mouse_linearity_ratio: linearity,
        has_mouse_curvature: detect_curvature(mouse),
        keystroke_interval_mean: key_mean,
        keystroke_interval_variance: key_var,
        keystroke_regularity: regularity,
        has_natural_pauses: detect_natural_pauses(keys, &key_intervals),
        behavior_diversity: behavior_diversity(tracking),
        sparse_mouse_data: sparse_mouse,
        sparse_keystroke_data: sparse_keys,
    }
}

pub(crate) fn intervals(timestamps: impl Iterator<Item = f64>) -> Vec<f64> {
    let ts: Vec<f64> = timestamps.collect();
    ts.windows(2).map(|pair| pair[1] - pair[0]).collect()
}

/// Population mean and variance. Returns zeros for an empty slice.
pub(crate) fn mean_variance(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|&v| (v - mean).powi(2)).sum::<f64>() / n;
    (mean, variance)
}

/// Pixel distance over elapsed ms for each consecutive pair; pairs with a
/// zero interval are skipped, not divided.
fn mouse_velocities(movements: &[MouseEvent]) -> Vec<f64> {
    movements
        .windows(2)
        .filter_map(|pair| {
            let dt = pair[1].timestamp - pair[0].timestamp;
            if dt <= 0.0 {
                return None;
            }
            let dx = pair[1].x - pair[0].x;
            let dy = pair[1].y - pair[0].y;
            Some((dx * dx + dy * dy).sqrt() / dt)
        })
        .collect()
}

fn local_slope(a: &MouseEvent, b: &MouseEvent) -> f64 {
    let dx = b.x - a.x;
    (b.y - a.y) / if dx == 0.0 { 1.0 } else { dx }
}

/// Fraction of consecutive movement triples whose local slope change is
/// below `epsilon`. A high ratio indicates scripted straight-line motion.
pub(crate) fn linearity_ratio(movements: &[MouseEvent], epsilon: f64) -> f64 {
    if movements.len() < 3 {
        return 0.0;
    }
    let linear = movements
        .windows(3)
        .filter(|w| (local_slope(&w[0], &w[1]) - local_slope(&w[1], &w[2])).abs() < epsilon)
        .count();
    linear as f64 / (movements.len() - 2) as f64
}

fn detect_curvature(movements: &[MouseEvent]) -> bool {
    if movements.len() < MIN_MOUSE_EVENTS {
        return false;
    }
    let curved = movements
        .windows(3)
        .filter(|w| {
            (local_slope(&w[0], &w[1]) - local_slope(&w[1], &w[2])).abs() > CURVATURE_THRESHOLD
        })
        .count();
    curved as f64 / (movements.len() - 2) as f64 > 0.3
}

/// `1 - distinct/total` over keystroke intervals, compared at millisecond
/// granularity. Near 1 means near-constant timing.
pub(crate) fn timing_regularity(key_intervals: &[f64]) -> f64 {
    if key_intervals.is_empty() {
        return 0.0;
    }
    let mut distinct: Vec<i64> = key_intervals.iter().map(|&i| i.round() as i64).collect();
    distinct.sort_unstable();
    distinct.dedup();
    1.0 - distinct.len() as f64 / key_intervals.len() as f64
}

fn detect_natural_pauses(keys: &[Keystroke], key_intervals: &[f64]) -> bool {
    if keys.len() < 5 {
        return false;
    }
    let pauses = key_intervals.iter().filter(|&&i| i > NATURAL_PAUSE_MS).count();
    pauses as f64 > key_intervals.len() as f64 * 0.1
}

/// Additive credit per present interaction channel, capped at 1.0.
/// Multi-modal interaction is harder to fully script.
fn behavior_diversity(tracking: &TrackingData) -> f64 {
    let mut diversity: f64 = 0.0;
    if !tracking.mouse_movements.is_empty() {
        diversity += 0.3;
    }
    if !tracking.keystrokes.is_empty() {
        diversity += 0.3;
    }
    if !tracking.form_interactions.is_empty() {
        diversity += 0.2;
    }
    if !tracking.scroll_events.is_empty() {
        diversity += 0.1;
    }
    if !tracking.touch_events.is_empty() {
        diversity += 0.1;
    }
    diversity.min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use briar_core::SessionMetrics;

    fn mouse_at(points: &[(f64, f64, f64)]) -> Vec<MouseEvent> {
        points
            .iter()
            .map(|&(x, y, timestamp)| MouseEvent { x, y, timestamp })
            .collect()
    }

    fn keys_at(times: &[f64]) -> Vec<Keystroke> {
        times
            .iter()
            .map(|&timestamp| Keystroke {
                key: "a".into(),
                timestamp,
            })
            .collect()
    }

    #[test]
    fn population_variance_of_constant_sequence_is_zero() {
        let (mean, var) = mean_variance(&[10.0, 10.0, 10.0, 10.0]);
        assert_eq!(mean, 10.0);
        assert_eq!(var, 0.0);
    }

    #[test]
    fn collinear_path_has_full_linearity() {
        let m = mouse_at(&[
            (0.0, 0.0, 0.0),
            (10.0, 10.0, 10.0),
            (20.0, 20.0, 20.0),
            (30.0, 30.0, 30.0),
            (40.0, 40.0, 40.0),
        ]);
        assert!((linearity_ratio(&m, 0.01) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn jittered_path_has_low_linearity() {
        let m = mouse_at(&[
            (0.0, 0.0, 0.0),
            (12.0, 3.0, 17.0),
            (19.0, 41.0, 55.0),
            (25.0, 12.0, 92.0),
            (60.0, 70.0, 140.0),
            (48.0, 90.0, 201.0),
        ]);
        assert!(linearity_ratio(&m, 0.01) < 0.3);
    }

    #[test]
    fn constant_keystroke_timing_is_fully_regular() {
        let iv = intervals([0.0, 100.0, 200.0, 300.0, 400.0].into_iter());
        let reg = timing_regularity(&iv);
        assert!(reg > 0.7, "regularity was {reg}");
    }

    #[test]
    fn unique_intervals_are_irregular() {
        let iv = intervals([0.0, 97.0, 211.0, 340.0, 512.0].into_iter());
        assert_eq!(timing_regularity(&iv), 0.0);
    }

    #[test]
    fn zero_interval_velocity_is_skipped() {
        let tracking = TrackingData {
            mouse_movements: mouse_at(&[
                (0.0, 0.0, 100.0),
                (50.0, 0.0, 100.0),
                (60.0, 5.0, 120.0),
                (70.0, 9.0, 145.0),
                (85.0, 20.0, 170.0),
            ]),
            ..Default::default()
        };
        let features = extract_features(&tracking);
        assert!(features.mouse_velocity_mean.is_finite());
    }

    #[test]
    fn empty_tracking_data_yields_neutral_vector() {
        let features = extract_features(&TrackingData::default());
        assert!(features.sparse_mouse_data);
        assert!(features.sparse_keystroke_data);
        assert!(features.mouse_interval_mean > 0.0);
        assert!(features.keystroke_interval_variance > 0.0);
        assert_eq!(features.behavior_diversity, 0.0);
    }

    #[test]
    fn diversity_credits_each_channel() {
        let tracking = TrackingData {
            mouse_movements: mouse_at(&[(0.0, 0.0, 0.0)]),
            keystrokes: keys_at(&[0.0]),
            form_interactions: [("email".to_string(), Default::default())].into(),
            scroll_events: vec![serde_json::json!({})],
            touch_events: vec![],
            session_metrics: SessionMetrics::default(),
        };
        let features = extract_features(&tracking);
        assert!((features.behavior_diversity - 0.9).abs() < 1e-9);
    }

    #[test]
    fn diversity_caps_at_one() {
        let tracking = TrackingData {
            mouse_movements: mouse_at(&[(0.0, 0.0, 0.0)]),
            keystrokes: keys_at(&[0.0]),
            form_interactions: [("email".to_string(), Default::default())].into(),
            scroll_events: vec![serde_json::json!({})],
            touch_events: vec![serde_json::json!({})],
            session_metrics: SessionMetrics::default(),
        };
        let features = extract_features(&tracking);
        assert!((features.behavior_diversity - 1.0).abs() < 1e-9);
    }

    #[test]
    fn curvature_fraction_is_over_triples() {
        // One direction break in ten events curves three of the eight
        // triples, past the 0.3 fraction.
        let mut pts: Vec<(f64, f64, f64)> = (0..10)
            .map(|i| (i as f64 * 10.0, i as f64 * 10.0, i as f64 * 50.0))
            .collect();
        pts[5].1 = 80.0;
        assert!(detect_curvature(&mouse_at(&pts)));
    }

    #[test]
    fn natural_pauses_detected_in_human_typing() {
        let keys = keys_at(&[0.0, 150.0, 400.0, 520.0, 900.0, 1010.0]);
        let iv = intervals(keys.iter().map(|k| k.timestamp));
        assert!(detect_natural_pauses(&keys, &iv));
    }
}
