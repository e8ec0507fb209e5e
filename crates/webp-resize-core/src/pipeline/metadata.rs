//! Before/after size accounting for a finished transcode.

use crate::types::{ImageMetadata, SourceFormat, TargetDimensions};

/// Format tag for every output.
pub const OUTPUT_FORMAT: &str = "webp";

/// `100 * (original - new) / original`, truncated toward zero.
///
/// Negative when the output is larger than the input. A zero-length
/// original yields 0.
pub fn size_reduction_percent(original_size: u64, new_size: u64) -> i64 {
    if original_size == 0 {
        return 0;
    }
    let original = i128::from(original_size);
    let new = i128::from(new_size);
    (100 * (original - new) / original) as i64
}

/// Assemble the metadata record for one transcode.
pub fn build_metadata(
    original_format: SourceFormat,
    original: (u32, u32),
    original_size: u64,
    target: TargetDimensions,
    new_size: u64,
) -> ImageMetadata {
    ImageMetadata {
        original_width: original.0,
        original_height: original.1,
        original_format,
        original_size_bytes: original_size,
        new_width: target.width,
        new_height: target.height,
        new_format: OUTPUT_FORMAT.to_string(),
        new_size_bytes: new_size,
        size_reduction_percent: size_reduction_percent(original_size, new_size),
    }
}
