//! Image decoding through an ordered fallback chain.
//!
//! The generic multi-format reader is tried first, then a BMP-specific path,
//! then libwebp. The first attempt that produces pixels wins. The chain does
//! not consult the sniffer; it stands on its own.

use image::{DynamicImage, GenericImageView, ImageFormat, ImageReader};
use std::io::Cursor;

use crate::error::PipelineError;
use crate::types::PixelGrid;

/// Smallest buffer any attempt will look at (a RIFF header).
const MIN_DECODE_LEN: usize = 12;

/// BMP file header length.
const BMP_HEADER_LEN: usize = 14;

type DecodeFn = fn(&[u8]) -> Result<DynamicImage, String>;
type CapabilityFn = fn(&[u8]) -> bool;

/// One candidate decode path in the chain.
#[derive(Clone, Copy)]
pub struct DecodeAttempt {
    name: &'static str,
    can_attempt: CapabilityFn,
    decode: DecodeFn,
}

impl DecodeAttempt {
    pub const fn new(name: &'static str, can_attempt: CapabilityFn, decode: DecodeFn) -> Self {
        Self {
            name,
            can_attempt,
            decode,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Generic reader over every format compiled into `image`.
    pub fn generic() -> Self {
        Self::new("generic", |data| !data.is_empty(), decode_generic)
    }

    /// Dedicated BMP path.
    pub fn bmp() -> Self {
        Self::new(
            "bmp",
            |data| ImageFormat::Bmp.reading_enabled() && data.len() >= BMP_HEADER_LEN,
            decode_bmp,
        )
    }

    /// libwebp decoder.
    pub fn webp() -> Self {
        Self::new("webp", |data| data.len() >= MIN_DECODE_LEN, decode_webp)
    }
}

impl std::fmt::Debug for DecodeAttempt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecodeAttempt")
            .field("name", &self.name)
            .finish()
    }
}

/// Decodes raw bytes into a [`PixelGrid`].
#[derive(Debug, Clone)]
pub struct ImageDecoder {
    attempts: Vec<DecodeAttempt>,
}

impl Default for ImageDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageDecoder {
    /// Create a decoder with the standard generic → BMP → WebP chain.
    pub fn new() -> Self {
        Self::with_attempts(vec![
            DecodeAttempt::generic(),
            DecodeAttempt::bmp(),
            DecodeAttempt::webp(),
        ])
    }

    /// Create a decoder with a custom attempt order.
    pub fn with_attempts(attempts: Vec<DecodeAttempt>) -> Self {
        Self { attempts }
    }

    /// Names of the attempts in the order they run.
    pub fn attempt_names(&self) -> Vec<&'static str> {
        self.attempts.iter().map(|a| a.name).collect()
    }

    /// Decode `data`, falling through the chain until an attempt succeeds.
    pub fn decode(&self, data: &[u8]) -> Result<PixelGrid, PipelineError> {
        let mut failures = Vec::with_capacity(self.attempts.len());

        for attempt in &self.attempts {
            if !(attempt.can_attempt)(data) {
                tracing::trace!("  Decode[{}]: skipped", attempt.name);
                continue;
            }

            match (attempt.decode)(data) {
                Ok(image) => {
                    let (width, height) = image.dimensions();
                    if width == 0 || height == 0 {
                        failures.push(format!("{}: empty image", attempt.name));
                        continue;
                    }
                    tracing::trace!("  Decode[{}]: {}x{}", attempt.name, width, height);
                    return Ok(PixelGrid::new(image));
                }
                Err(e) => {
                    tracing::trace!("  Decode[{}]: {}", attempt.name, e);
                    failures.push(format!("{}: {}", attempt.name, e));
                }
            }
        }

        if failures.is_empty() {
            failures.push("no decoder accepted the input".to_string());
        }
        Err(PipelineError::InvalidImage(failures.join("; ")))
    }
}

fn decode_generic(data: &[u8]) -> Result<DynamicImage, String> {
    ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| format!("cannot detect image format: {}", e))?
        .decode()
        .map_err(|e| e.to_string())
}

fn decode_bmp(data: &[u8]) -> Result<DynamicImage, String> {
    image::load_from_memory_with_format(data, ImageFormat::Bmp).map_err(|e| e.to_string())
}

fn decode_webp(data: &[u8]) -> Result<DynamicImage, String> {
    webp::Decoder::new(data)
        .decode()
        .map(|decoded| decoded.to_image())
        .ok_or_else(|| "libwebp could not decode the buffer".to_string())
}
