//! Lanczos resampling to exact target dimensions.

use image::imageops::FilterType;

use crate::error::PipelineError;
use crate::types::{PixelGrid, TargetDimensions};

/// Filter used for every resize.
pub const RESAMPLE_FILTER: FilterType = FilterType::Lanczos3;

/// Produce a new grid at exactly `target`.
///
/// Runs even when `target` equals the source size; the result is then an
/// identical copy.
pub fn resample(grid: &PixelGrid, target: TargetDimensions) -> Result<PixelGrid, PipelineError> {
    if target.width == 0 || target.height == 0 {
        return Err(PipelineError::ResizeFailed(format!(
            "zero-area target {}x{}",
            target.width, target.height
        )));
    }

    if grid.dimensions() == (target.width, target.height) {
        return Ok(grid.clone());
    }

    let resized = grid
        .image()
        .resize_exact(target.width, target.height, RESAMPLE_FILTER);

    if (resized.width(), resized.height()) != (target.width, target.height) {
        return Err(PipelineError::ResizeFailed(format!(
            "resampler produced {}x{}, expected {}x{}",
            resized.width(),
            resized.height(),
            target.width,
            target.height
        )));
    }

    Ok(PixelGrid::new(resized))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::DynamicImage;

    fn grid(width: u32, height: u32) -> PixelGrid {
        PixelGrid::new(DynamicImage::new_rgba8(width, height))
    }

    #[test]
    fn test_downscale_to_exact_size() {
        let out = resample(
            &grid(500, 300),
            TargetDimensions {
                width: 300,
                height: 180,
            },
        )
        .unwrap();
        assert_eq!(out.dimensions(), (300, 180));
    }

    #[test]
    fn test_same_size_is_pass_through() {
        let source = grid(64, 32);
        let out = resample(
            &source,
            TargetDimensions {
                width: 64,
                height: 32,
            },
        )
        .unwrap();
        assert_eq!(out.dimensions(), (64, 32));
        assert_eq!(out.image().as_bytes(), source.image().as_bytes());
    }

    #[test]
    fn test_zero_area_target_fails() {
        let err = resample(
            &grid(10, 10),
            TargetDimensions {
                width: 0,
                height: 5,
            },
        )
        .unwrap_err();
        assert!(matches!(err, PipelineError::ResizeFailed(_)));
    }

    #[test]
    fn test_down_to_single_pixel() {
        let out = resample(
            &grid(1000, 1),
            TargetDimensions {
                width: 100,
                height: 1,
            },
        )
        .unwrap();
        assert_eq!(out.dimensions(), (100, 1));
    }
}
