//! Error types for the WebP resize pipeline.
//!
//! Errors are organized by concern: configuration, the transcoding pipeline
//! itself, and the collaborators that hand the pipeline its input bytes.
//! Every pipeline error is terminal for the request that raised it.

use thiserror::Error;

/// Top-level error type for webp-resize operations.
#[derive(Error, Debug)]
pub enum WebpResizeError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Pipeline processing errors
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// Errors obtaining the input image (URL fetch or upload)
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Pipeline errors, one kind per failing stage.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// No known container signature in the leading bytes
    #[error("Unsupported image format: {0}")]
    UnsupportedFormat(String),

    /// Every decode attempt failed
    #[error("Invalid or undecodable image: {0}")]
    InvalidImage(String),

    /// The resampler could not produce the target grid
    #[error("Image resizing failed: {0}")]
    ResizeFailed(String),

    /// WebP encoding failed
    #[error("WebP encoding failed: {0}")]
    EncodingFailed(String),

    /// Decoded image dimensions exceed the configured limit
    #[error("Image too large: {width}x{height} > {max_dim}")]
    ImageTooLarge { width: u32, height: u32, max_dim: u32 },

    /// The caller-side timeout fired before the pipeline finished
    #[error("Timeout in {stage} stage after {timeout_ms}ms")]
    Timeout { stage: String, timeout_ms: u64 },

    /// The blocking worker running the pipeline died
    #[error("Pipeline task failed: {0}")]
    Internal(String),
}

/// Errors produced while obtaining the raw input bytes.
#[derive(Error, Debug)]
pub enum SourceError {
    /// No URL supplied
    #[error("URL cannot be empty")]
    EmptyUrl,

    /// URL failed to parse or uses a scheme other than http/https
    #[error("Invalid URL format: {0}")]
    InvalidUrl(String),

    /// Transport-level failure talking to the remote host
    #[error("HTTP request failed: {0}")]
    RequestFailed(String),

    /// Remote host answered with something other than 200 OK
    #[error("HTTP request failed: server returned status {0}")]
    HttpStatus(u16),

    /// Fetched or uploaded content was empty
    #[error("File content is empty")]
    EmptyFile,

    /// Input exceeds the configured size limit
    #[error("Input too large: more than {max_mb}MB")]
    TooLarge { max_mb: u64 },

    /// Upload file name is missing an allowed image extension
    #[error("Invalid file type: {0}")]
    InvalidFileType(String),

    /// The query string could not be parsed
    #[error("Invalid query string: {0}")]
    InvalidQuery(String),

    /// The expected multipart field was absent
    #[error("No file found in request field '{0}'")]
    NoFile(String),

    /// Reading the input body failed part-way
    #[error("Failed to read input: {0}")]
    Read(String),
}

/// Convenience type alias for webp-resize results.
pub type Result<T> = std::result::Result<T, WebpResizeError>;

/// Convenience type alias for pipeline-specific results.
pub type PipelineResult<T> = std::result::Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_error_converts_to_top_level() {
        let err: WebpResizeError = PipelineError::InvalidImage("bad bytes".into()).into();
        assert!(err.to_string().contains("bad bytes"));
        assert!(matches!(err, WebpResizeError::Pipeline(_)));
    }

    #[test]
    fn test_http_status_message() {
        let err = SourceError::HttpStatus(404);
        assert_eq!(
            err.to_string(),
            "HTTP request failed: server returned status 404"
        );
    }
}
