//! webp-resize core - bounded, aspect-preserving WebP transcoding.
//!
//! Takes an arbitrary raster image as bytes and produces a lossy WebP that
//! fits inside a bounding box, together with before/after metadata.
//!
//! # Architecture
//!
//! The pipeline is a pure function over its input buffer, with no shared
//! state between invocations:
//!
//! ```text
//! Bytes → Sniff → Decode → Dimensions → Resample → Encode → Metadata
//! ```
//!
//! Fetching from URLs and validating uploads live in [`source`]; they only
//! produce the byte buffer the pipeline consumes.
//!
//! # Usage
//!
//! ```rust,ignore
//! use webp_resize_core::{transcode, ProcessOptions};
//!
//! let bytes = std::fs::read("photo.png")?;
//! let out = transcode(&bytes, &ProcessOptions::default())?;
//! std::fs::write("photo.webp", &out.data)?;
//! println!("saved {}%", out.metadata.size_reduction_percent);
//! ```

// Module declarations
pub mod config;
pub mod error;
pub mod output;
pub mod params;
pub mod pipeline;
pub mod source;
pub mod types;

// Re-exports for convenient access
pub use config::Config;
pub use error::{
    ConfigError, PipelineError, PipelineResult, Result, SourceError, WebpResizeError,
};
pub use output::{OutputFormat, OutputWriter};
pub use params::{RequestParams, ResponseFlags};
pub use pipeline::{transcode, DiscoveredFile, FileDiscovery, ImageProcessor};
pub use source::{HttpFetcher, ImageFetcher};
pub use types::{
    ImageMetadata, PixelGrid, ProcessOptions, RawImage, SourceFormat, TargetDimensions,
    Transcoded,
};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
