//! Aspect-ratio-preserving target size calculation.

use crate::types::TargetDimensions;

/// Fit `original` inside the `max` bounding box without upscaling.
///
/// Images already inside the box keep their size. Otherwise the smaller of
/// the two axis scales is applied to both axes and each side is rounded
/// half-up, never below 1.
pub fn calculate_dimensions(
    original_width: u32,
    original_height: u32,
    max_width: u32,
    max_height: u32,
) -> TargetDimensions {
    if original_width <= max_width && original_height <= max_height {
        return TargetDimensions {
            width: original_width,
            height: original_height,
        };
    }

    let width_scale = f64::from(max_width) / f64::from(original_width);
    let height_scale = f64::from(max_height) / f64::from(original_height);
    let scale = width_scale.min(height_scale);

    TargetDimensions {
        width: round_half_up(f64::from(original_width) * scale),
        height: round_half_up(f64::from(original_height) * scale),
    }
}

fn round_half_up(value: f64) -> u32 {
    // Scaled sides never exceed the original u32 side
    ((value + 0.5).floor() as u32).max(1)
}
