//! Sub-configuration structs with service defaults.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::types::ProcessOptions;

/// HTTP service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind
    pub host: String,

    /// Port to listen on (the `PORT` environment variable wins)
    pub port: u16,

    /// Directory holding the built frontend, served at `/`
    pub static_dir: PathBuf,

    /// Directory of test pages, served at `/test/`
    pub test_dir: PathBuf,

    /// Grace period for in-flight requests on shutdown
    pub shutdown_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            static_dir: PathBuf::from("./static"),
            test_dir: PathBuf::from("./test/testdata"),
            shutdown_timeout_secs: 30,
        }
    }
}

/// Processing defaults applied when a request leaves an option out.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultsConfig {
    /// Bounding box width
    pub max_width: u32,

    /// Bounding box height
    pub max_height: u32,

    /// WebP quality (1-100)
    pub quality: i32,

    /// Reserved; aspect ratio is always preserved
    pub preserve_ratio: bool,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            max_width: 1920,
            max_height: 1080,
            quality: 85,
            preserve_ratio: true,
        }
    }
}

impl DefaultsConfig {
    /// Options to start request parsing from.
    pub fn process_options(&self) -> ProcessOptions {
        ProcessOptions {
            max_width: self.max_width,
            max_height: self.max_height,
            quality: self.quality,
            preserve_ratio: self.preserve_ratio,
        }
    }
}

/// Resource limits to protect against problematic inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum input size (fetched body or upload) in megabytes
    pub max_input_mb: u64,

    /// Maximum decoded image dimension (width or height)
    pub max_image_dimension: u32,

    /// URL fetch timeout in milliseconds
    pub fetch_timeout_ms: u64,

    /// Transcode timeout in milliseconds
    pub transcode_timeout_ms: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_input_mb: 32,
            max_image_dimension: 20000,
            fetch_timeout_ms: 30000,
            transcode_timeout_ms: 60000,
        }
    }
}

impl LimitsConfig {
    /// `max_input_mb` in bytes, saturating at `u64::MAX`.
    pub fn max_input_bytes(&self) -> u64 {
        self.max_input_mb.saturating_mul(1024 * 1024)
    }
}

/// Upload handling settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    /// Multipart field carrying the image
    pub field_name: String,

    /// Accepted upload file extensions (lowercase, without the dot)
    pub allowed_extensions: Vec<String>,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            field_name: "image".to_string(),
            allowed_extensions: vec![
                "jpg".to_string(),
                "jpeg".to_string(),
                "png".to_string(),
                "gif".to_string(),
                "bmp".to_string(),
                "tiff".to_string(),
                "webp".to_string(),
            ],
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    pub level: String,

    /// Log format (pretty, json)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_input_bytes_saturates() {
        let limits = LimitsConfig {
            max_input_mb: u64::MAX,
            ..LimitsConfig::default()
        };
        assert_eq!(limits.max_input_bytes(), u64::MAX);
        assert_eq!(LimitsConfig::default().max_input_bytes(), 32 * 1024 * 1024);
    }
}
