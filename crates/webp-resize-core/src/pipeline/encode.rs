//! Lossy WebP encoding with clamped quality.

use image::DynamicImage;

use crate::error::PipelineError;
use crate::types::PixelGrid;

/// Lowest and highest quality libwebp accepts.
pub const MIN_QUALITY: i32 = 0;
pub const MAX_QUALITY: i32 = 100;

/// Clamp a requested quality into `0..=100`.
pub fn clamp_quality(quality: i32) -> u8 {
    quality.clamp(MIN_QUALITY, MAX_QUALITY) as u8
}

/// Encode `grid` as lossy WebP.
///
/// Images with an alpha channel are encoded from RGBA, everything else from
/// RGB. Failures are final: there is no retry.
pub fn encode_webp(grid: &PixelGrid, quality: i32) -> Result<Vec<u8>, PipelineError> {
    let quality = f32::from(clamp_quality(quality));
    let (width, height) = grid.dimensions();

    let encoded = match grid.image() {
        image if image.color().has_alpha() => {
            let rgba = image.to_rgba8();
            webp::Encoder::from_rgba(rgba.as_raw(), width, height).encode_simple(false, quality)
        }
        DynamicImage::ImageRgb8(rgb) => {
            webp::Encoder::from_rgb(rgb.as_raw(), width, height).encode_simple(false, quality)
        }
        image => {
            let rgb = image.to_rgb8();
            webp::Encoder::from_rgb(rgb.as_raw(), width, height).encode_simple(false, quality)
        }
    };

    let memory = encoded.map_err(|e| {
        PipelineError::EncodingFailed(format!("libwebp rejected {}x{}: {:?}", width, height, e))
    })?;

    if memory.is_empty() {
        return Err(PipelineError::EncodingFailed(
            "encoder produced no output".to_string(),
        ));
    }

    Ok(memory.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::decode::ImageDecoder;
    use image::{Rgba, RgbaImage};

    fn gradient(width: u32, height: u32) -> PixelGrid {
        PixelGrid::new(DynamicImage::ImageRgba8(RgbaImage::from_fn(
            width,
            height,
            |x, y| Rgba([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8, 255]),
        )))
    }

    #[test]
    fn test_clamp_quality() {
        assert_eq!(clamp_quality(-5), 0);
        assert_eq!(clamp_quality(0), 0);
        assert_eq!(clamp_quality(80), 80);
        assert_eq!(clamp_quality(100), 100);
        assert_eq!(clamp_quality(150), 100);
        assert_eq!(clamp_quality(i32::MIN), 0);
        assert_eq!(clamp_quality(i32::MAX), 100);
    }

    #[test]
    fn test_output_is_webp_container() {
        let bytes = encode_webp(&gradient(64, 48), 80).unwrap();
        assert_eq!(&bytes[0..4], b"RIFF");
        assert_eq!(&bytes[8..12], b"WEBP");
    }

    #[test]
    fn test_out_of_range_quality_matches_clamped() {
        let grid = gradient(64, 64);
        assert_eq!(
            encode_webp(&grid, -5).unwrap(),
            encode_webp(&grid, 0).unwrap()
        );
        assert_eq!(
            encode_webp(&grid, 150).unwrap(),
            encode_webp(&grid, 100).unwrap()
        );
    }

    #[test]
    fn test_round_trip_keeps_dimensions() {
        let bytes = encode_webp(&gradient(120, 90), 80).unwrap();
        let decoded = ImageDecoder::new().decode(&bytes).unwrap();
        assert_eq!(decoded.dimensions(), (120, 90));
    }

    #[test]
    fn test_rgb_and_luma_inputs_encode() {
        let rgb = PixelGrid::new(DynamicImage::new_rgb8(10, 10));
        assert!(encode_webp(&rgb, 80).is_ok());

        let luma = PixelGrid::new(DynamicImage::new_luma8(10, 10));
        assert!(encode_webp(&luma, 80).is_ok());
    }

    #[test]
    fn test_lower_quality_is_not_larger() {
        let grid = gradient(256, 256);
        let low = encode_webp(&grid, 10).unwrap();
        let high = encode_webp(&grid, 95).unwrap();
        assert!(low.len() <= high.len());
    }

    #[test]
    fn test_oversized_grid_fails_to_encode() {
        // libwebp caps each side at 16383 pixels
        let grid = PixelGrid::new(DynamicImage::new_luma8(16384, 1));
        let err = encode_webp(&grid, 80).unwrap_err();
        assert!(matches!(err, PipelineError::EncodingFailed(_)));
    }
}
