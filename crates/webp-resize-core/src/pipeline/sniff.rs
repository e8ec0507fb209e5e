//! Container format detection from leading magic bytes.
//!
//! Only the signature is inspected; malformed bodies are left for the
//! decoder to reject.

use crate::error::PipelineError;
use crate::types::SourceFormat;

/// Shortest buffer the sniffer will classify.
pub const MIN_SNIFF_LEN: usize = 8;

const JPEG_MAGIC: [u8; 3] = [0xFF, 0xD8, 0xFF];
const PNG_MAGIC: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
const BMP_MAGIC: [u8; 2] = [0x42, 0x4D];
const RIFF_MAGIC: [u8; 4] = [0x52, 0x49, 0x46, 0x46];
const WEBP_MAGIC: [u8; 4] = [0x57, 0x45, 0x42, 0x50];

/// Classify a buffer as JPEG, PNG, BMP or WebP.
///
/// Signatures are checked in that order and the first match wins.
pub fn detect_format(data: &[u8]) -> Result<SourceFormat, PipelineError> {
    if data.len() < MIN_SNIFF_LEN {
        return Err(PipelineError::UnsupportedFormat(format!(
            "need at least {} bytes, got {}",
            MIN_SNIFF_LEN,
            data.len()
        )));
    }

    if data.starts_with(&JPEG_MAGIC) {
        return Ok(SourceFormat::Jpeg);
    }

    if data.starts_with(&PNG_MAGIC) {
        return Ok(SourceFormat::Png);
    }

    if data.starts_with(&BMP_MAGIC) {
        return Ok(SourceFormat::Bmp);
    }

    // WebP: RIFF....WEBP
    if data.starts_with(&RIFF_MAGIC) && data.get(8..12) == Some(&WEBP_MAGIC[..]) {
        return Ok(SourceFormat::WebP);
    }

    Err(PipelineError::UnsupportedFormat(
        "unrecognized magic bytes".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_jpeg() {
        let header = [0xFF, 0xD8, 0xFF, 0xE0, 0, 0x10, b'J', b'F', b'I', b'F'];
        assert_eq!(detect_format(&header).unwrap(), SourceFormat::Jpeg);
    }

    #[test]
    fn test_detect_png() {
        let header = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
        assert_eq!(detect_format(&header).unwrap(), SourceFormat::Png);
    }

    #[test]
    fn test_detect_bmp() {
        let header = [b'B', b'M', 0x36, 0x00, 0, 0, 0, 0, 0, 0];
        assert_eq!(detect_format(&header).unwrap(), SourceFormat::Bmp);
    }

    #[test]
    fn test_detect_webp() {
        let header = [b'R', b'I', b'F', b'F', 0x24, 0, 0, 0, b'W', b'E', b'B', b'P'];
        assert_eq!(detect_format(&header).unwrap(), SourceFormat::WebP);
    }

    #[test]
    fn test_riff_without_webp_fourcc_rejected() {
        // A WAV file shares the RIFF prefix
        let header = [b'R', b'I', b'F', b'F', 0x24, 0, 0, 0, b'W', b'A', b'V', b'E'];
        assert!(matches!(
            detect_format(&header),
            Err(PipelineError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_short_riff_rejected() {
        let header = [b'R', b'I', b'F', b'F', 0, 0, 0, 0, b'W'];
        assert!(detect_format(&header).is_err());
    }

    #[test]
    fn test_short_buffer_rejected() {
        // Valid JPEG prefix but under the minimum length
        let header = [0xFF, 0xD8, 0xFF, 0xE0, 0, 0, 0];
        assert!(matches!(
            detect_format(&header),
            Err(PipelineError::UnsupportedFormat(_))
        ));
        assert!(detect_format(&[]).is_err());
    }

    #[test]
    fn test_unknown_bytes_rejected() {
        let gif = *b"GIF89a\x01\x00\x01\x00";
        assert!(matches!(
            detect_format(&gif),
            Err(PipelineError::UnsupportedFormat(_))
        ));
        assert!(detect_format(&[0u8; 16]).is_err());
    }
}
