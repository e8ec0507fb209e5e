//! Core data types for the WebP resize pipeline.
//!
//! These types flow between the stages: raw input bytes in, a decoded pixel
//! grid in the middle, WebP bytes plus [`ImageMetadata`] out.

use image::{DynamicImage, GenericImageView};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Container format of an input buffer, as classified by its magic bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    Jpeg,
    Png,
    Bmp,
    WebP,
    Unknown,
}

impl SourceFormat {
    /// Lowercase tag used in metadata output.
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceFormat::Jpeg => "jpeg",
            SourceFormat::Png => "png",
            SourceFormat::Bmp => "bmp",
            SourceFormat::WebP => "webp",
            SourceFormat::Unknown => "unknown",
        }
    }
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An undecoded input buffer and its sniffed format.
///
/// Produced by the fetch/upload layer and consumed once by the decoder.
#[derive(Debug, Clone)]
pub struct RawImage {
    bytes: Vec<u8>,
    format: SourceFormat,
}

impl RawImage {
    pub fn new(bytes: Vec<u8>, format: SourceFormat) -> Self {
        Self { bytes, format }
    }

    /// Classify `bytes` with the format sniffer.
    pub fn sniffed(bytes: Vec<u8>) -> crate::error::PipelineResult<Self> {
        let format = crate::pipeline::sniff::detect_format(&bytes)?;
        Ok(Self { bytes, format })
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn format(&self) -> SourceFormat {
        self.format
    }

    /// Size of the original buffer in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// A decoded image held in memory for the duration of one transcode.
#[derive(Debug, Clone)]
pub struct PixelGrid {
    image: DynamicImage,
}

impl PixelGrid {
    pub fn new(image: DynamicImage) -> Self {
        Self { image }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    pub fn image(&self) -> &DynamicImage {
        &self.image
    }

    pub fn into_image(self) -> DynamicImage {
        self.image
    }
}

/// Options controlling a single transcode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessOptions {
    /// Bounding box width; must be > 0
    pub max_width: u32,

    /// Bounding box height; must be > 0
    pub max_height: u32,

    /// Requested lossy quality. Signed on purpose: the encoder clamps
    /// to 0..=100 whatever the caller sends.
    pub quality: i32,

    /// Reserved. The dimension calculator always preserves aspect ratio.
    pub preserve_ratio: bool,
}

impl Default for ProcessOptions {
    fn default() -> Self {
        Self {
            max_width: 1920,
            max_height: 1080,
            quality: 80,
            preserve_ratio: true,
        }
    }
}

/// Output dimensions computed from the original size and the bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetDimensions {
    pub width: u32,
    pub height: u32,
}

/// Before/after accounting for one transcode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageMetadata {
    pub original_width: u32,
    pub original_height: u32,
    pub original_format: SourceFormat,
    #[serde(rename = "original_size")]
    pub original_size_bytes: u64,
    pub new_width: u32,
    pub new_height: u32,
    pub new_format: String,
    #[serde(rename = "new_size")]
    pub new_size_bytes: u64,
    /// Truncated percentage; negative when the WebP output grew.
    pub size_reduction_percent: i64,
}

/// WebP bytes paired with their metadata.
#[derive(Debug, Clone)]
pub struct Transcoded {
    pub data: Vec<u8>,
    pub metadata: ImageMetadata,
}
