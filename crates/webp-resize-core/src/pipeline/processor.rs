//! Pipeline orchestration - wires the stages into a single transcode.
//!
//! ```text
//! bytes → sniff → decode → dimensions → resample → encode → metadata
//! ```
//!
//! [`transcode`] is synchronous and holds no shared state. [`ImageProcessor`]
//! is the caller-side wrapper that moves it onto the blocking pool and bounds
//! it with a timeout.

use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::timeout;

use std::path::Path;

use crate::config::LimitsConfig;
use crate::error::{PipelineError, PipelineResult, Result};
use crate::types::{ProcessOptions, RawImage, SourceFormat, Transcoded};

use super::decode::ImageDecoder;
use super::dimensions::calculate_dimensions;
use super::encode::encode_webp;
use super::metadata::build_metadata;
use super::resample::resample;
use super::sniff::detect_format;

/// Transcode `data` to WebP with the default decoder chain and no size cap.
pub fn transcode(data: &[u8], options: &ProcessOptions) -> PipelineResult<Transcoded> {
    Transcoder::default().transcode(data, options)
}

/// Synchronous pipeline with a configurable decoder chain.
#[derive(Debug, Clone, Default)]
pub struct Transcoder {
    decoder: ImageDecoder,
    max_image_dimension: Option<u32>,
}

impl Transcoder {
    pub fn new(decoder: ImageDecoder) -> Self {
        Self {
            decoder,
            max_image_dimension: None,
        }
    }

    /// Reject decoded images with a side longer than `max_dim`.
    pub fn with_max_image_dimension(mut self, max_dim: u32) -> Self {
        self.max_image_dimension = Some(max_dim);
        self
    }

    /// Sniff `data`, then run the remaining stages. Any failure ends the
    /// transcode.
    pub fn transcode(&self, data: &[u8], options: &ProcessOptions) -> PipelineResult<Transcoded> {
        let format = detect_format(data)?;
        tracing::trace!("  Sniff: {}", format);
        self.run(data, format, options)
    }

    /// Transcode an already-sniffed input.
    pub fn transcode_raw(
        &self,
        raw: &RawImage,
        options: &ProcessOptions,
    ) -> PipelineResult<Transcoded> {
        self.run(raw.bytes(), raw.format(), options)
    }

    fn run(
        &self,
        data: &[u8],
        format: SourceFormat,
        options: &ProcessOptions,
    ) -> PipelineResult<Transcoded> {
        let start = Instant::now();

        let grid = self.decoder.decode(data)?;
        let (original_width, original_height) = grid.dimensions();
        tracing::trace!("  Decode: {:?}", start.elapsed());

        if let Some(max_dim) = self.max_image_dimension {
            if original_width > max_dim || original_height > max_dim {
                return Err(PipelineError::ImageTooLarge {
                    width: original_width,
                    height: original_height,
                    max_dim,
                });
            }
        }

        if !options.preserve_ratio {
            tracing::debug!("preserve_ratio=false is reserved; keeping aspect ratio");
        }
        let target = calculate_dimensions(
            original_width,
            original_height,
            options.max_width,
            options.max_height,
        );

        let resize_start = Instant::now();
        let resized = resample(&grid, target)?;
        drop(grid);
        tracing::trace!("  Resample: {:?}", resize_start.elapsed());

        let encode_start = Instant::now();
        let encoded = encode_webp(&resized, options.quality)?;
        tracing::trace!("  Encode: {:?}", encode_start.elapsed());

        let metadata = build_metadata(
            format,
            (original_width, original_height),
            data.len() as u64,
            target,
            encoded.len() as u64,
        );

        tracing::debug!(
            "Transcoded {} {}x{} -> webp {}x{} ({} -> {} bytes, {}%) in {:?}",
            metadata.original_format,
            metadata.original_width,
            metadata.original_height,
            metadata.new_width,
            metadata.new_height,
            metadata.original_size_bytes,
            metadata.new_size_bytes,
            metadata.size_reduction_percent,
            start.elapsed()
        );

        Ok(Transcoded {
            data: encoded,
            metadata,
        })
    }
}

/// Runs transcodes on the blocking pool under the configured limits.
#[derive(Debug, Clone)]
pub struct ImageProcessor {
    transcoder: Arc<Transcoder>,
    limits: LimitsConfig,
}

impl ImageProcessor {
    /// Create a new processor with the given limits.
    pub fn new(limits: LimitsConfig) -> Self {
        let transcoder = Transcoder::new(ImageDecoder::new())
            .with_max_image_dimension(limits.max_image_dimension);
        Self {
            transcoder: Arc::new(transcoder),
            limits,
        }
    }

    pub fn limits(&self) -> &LimitsConfig {
        &self.limits
    }

    /// Transcode `data` off the async executor, bounded by
    /// `limits.transcode_timeout_ms`.
    ///
    /// On timeout the blocking task is abandoned, not cancelled; it runs to
    /// completion and its result is dropped.
    pub async fn process(
        &self,
        data: Vec<u8>,
        options: ProcessOptions,
    ) -> PipelineResult<Transcoded> {
        let raw = RawImage::sniffed(data)?;
        let transcoder = Arc::clone(&self.transcoder);
        let timeout_ms = self.limits.transcode_timeout_ms;

        let result = timeout(
            Duration::from_millis(timeout_ms),
            tokio::task::spawn_blocking(move || transcoder.transcode_raw(&raw, &options)),
        )
        .await;

        match result {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(e)) => Err(PipelineError::Internal(format!("Task join error: {}", e))),
            Err(_) => Err(PipelineError::Timeout {
                stage: "transcode".to_string(),
                timeout_ms,
            }),
        }
    }

    /// Read `path` and transcode its contents.
    pub async fn process_file(&self, path: &Path, options: ProcessOptions) -> Result<Transcoded> {
        let data = tokio::fs::read(path).await?;
        Ok(self.process(data, options).await?)
    }
}
