use crate::types::{NUM_LANDMARKS, Point};

pub const STATIC_FEATURE_LEN: usize = NUM_LANDMARKS * 2;

/// Normalize landmarks for the static classifier (matching training normalization).
///
/// Points are made relative to the wrist (point 0), flattened to
/// `[x0, y0, x1, y1, ..., x20, y20]` and divided by the largest absolute
/// component, so the output is translation and scale invariant.
pub fn normalize_landmarks(landmarks: &[Point; NUM_LANDMARKS]) -> Vec<f32> {
    let wrist = landmarks[0];

    let mut result = Vec::with_capacity(STATIC_FEATURE_LEN);
    for &(x, y) in landmarks {
        result.push((x - wrist.0) as f32);
        result.push((y - wrist.1) as f32);
    }

    let max_value = result.iter().fold(0.0f32, |acc, v| acc.max(v.abs()));
    // All points collapsed onto the wrist: already as normalized as it gets.
    if max_value > 0.0 {
        for v in result.iter_mut() {
            *v /= max_value;
        }
    }

    result
}
