//! Transcoding pipeline components.
//!
//! This module contains all the stages of the pipeline, in execution order:
//! - **sniff**: Classify the container format from magic bytes
//! - **decode**: Decode bytes to pixels through a fallback chain
//! - **dimensions**: Fit the original size inside the bounding box
//! - **resample**: Lanczos resize to the target size
//! - **encode**: Lossy WebP encoding with clamped quality
//! - **metadata**: Before/after size accounting
//! - **processor**: Orchestrates the full pipeline
//!
//! Plus **discovery**, which finds input files for batch conversion.

pub mod decode;
pub mod dimensions;
pub mod discovery;
pub mod encode;
pub mod metadata;
pub mod processor;
pub mod resample;
pub mod sniff;

// Re-exports for convenient access
pub use decode::{DecodeAttempt, ImageDecoder};
pub use dimensions::calculate_dimensions;
pub use discovery::{DiscoveredFile, FileDiscovery};
pub use encode::{clamp_quality, encode_webp};
pub use metadata::{build_metadata, size_reduction_percent};
pub use processor::{transcode, ImageProcessor, Transcoder};
pub use resample::resample;
pub use sniff::detect_format;
