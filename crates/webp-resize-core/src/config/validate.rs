//! Configuration validation with range checks.

use crate::error::ConfigError;

use super::Config;

/// Upper bound for `limits.max_input_mb` (1 TiB).
pub(crate) const MAX_INPUT_MB: u64 = 1024 * 1024;

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.defaults.max_width == 0 {
            return Err(ConfigError::ValidationError(
                "defaults.max_width must be > 0".into(),
            ));
        }
        if self.defaults.max_height == 0 {
            return Err(ConfigError::ValidationError(
                "defaults.max_height must be > 0".into(),
            ));
        }
        if !(1..=100).contains(&self.defaults.quality) {
            return Err(ConfigError::ValidationError(
                "defaults.quality must be between 1 and 100".into(),
            ));
        }
        if !(1..=MAX_INPUT_MB).contains(&self.limits.max_input_mb) {
            return Err(ConfigError::ValidationError(format!(
                "limits.max_input_mb must be between 1 and {}",
                MAX_INPUT_MB
            )));
        }
        if self.limits.max_image_dimension == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_image_dimension must be > 0".into(),
            ));
        }
        if self.limits.fetch_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "limits.fetch_timeout_ms must be > 0".into(),
            ));
        }
        if self.limits.transcode_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "limits.transcode_timeout_ms must be > 0".into(),
            ));
        }
        if self.upload.field_name.is_empty() {
            return Err(ConfigError::ValidationError(
                "upload.field_name must not be empty".into(),
            ));
        }
        if self.upload.allowed_extensions.is_empty() {
            return Err(ConfigError::ValidationError(
                "upload.allowed_extensions must not be empty".into(),
            ));
        }
        Ok(())
    }
}
