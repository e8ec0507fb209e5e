//! Configuration management for webp-resize.
//!
//! Configuration is loaded from the platform config directory with sensible
//! defaults. All config structs implement `Default`.

mod types;
mod validate;

pub use types::*;

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable that overrides `server.port`.
pub const PORT_ENV: &str = "PORT";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP service settings
    pub server: ServerConfig,

    /// Processing defaults
    pub defaults: DefaultsConfig,

    /// Resource limits
    pub limits: LimitsConfig,

    /// Upload settings
    pub upload: UploadConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Returns default configuration if the file doesn't exist. The `PORT`
    /// environment variable is applied on top either way.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        let mut config = if path.exists() {
            Self::load_from(&path)?
        } else {
            Self::default()
        };
        config.apply_env(std::env::var(PORT_ENV).ok().as_deref())?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply a `PORT` override.
    pub fn apply_env(&mut self, port: Option<&str>) -> Result<(), ConfigError> {
        if let Some(port) = port.map(str::trim).filter(|p| !p.is_empty()) {
            self.server.port = port.parse().map_err(|_| {
                ConfigError::ValidationError(format!(
                    "{PORT_ENV} must be a port number, got '{port}'"
                ))
            })?;
        }
        Ok(())
    }

    /// Get the default config file path.
    ///
    /// Uses platform-appropriate directories:
    /// - macOS: ~/Library/Application Support/com.webp-resize.webp-resize/config.toml
    /// - Linux: ~/.config/webp-resize/config.toml
    /// - Windows: C:\Users\<User>\AppData\Roaming\webp-resize\config\config.toml
    ///
    /// Falls back to ~/.webp-resize/config.toml if directory detection fails.
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("com", "webp-resize", "webp-resize")
            .map(|dirs| dirs.config_dir().to_path_buf().join("config.toml"))
            .unwrap_or_else(|| {
                let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
                PathBuf::from(home).join(".webp-resize").join("config.toml")
            })
    }

    /// Resolved frontend directory (with ~ expansion).
    pub fn static_dir(&self) -> PathBuf {
        expand(&self.server.static_dir)
    }

    /// Resolved test page directory (with ~ expansion).
    pub fn test_dir(&self) -> PathBuf {
        expand(&self.server.test_dir)
    }

    /// `host:port` to bind.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Serialize the config to a pretty TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ValidationError(e.to_string()))
    }
}

fn expand(path: &Path) -> PathBuf {
    let path_str = path.to_string_lossy();
    let expanded = shellexpand::tilde(&path_str);
    PathBuf::from(expanded.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.defaults.max_width, 1920);
        assert_eq!(config.defaults.max_height, 1080);
        assert_eq!(config.defaults.quality, 85);
        assert_eq!(config.limits.max_input_mb, 32);
        assert_eq!(config.upload.field_name, "image");
    }

    #[test]
    fn test_config_to_toml() {
        let config = Config::default();
        let toml = config.to_toml().unwrap();
        assert!(toml.contains("[server]"));
        assert!(toml.contains("[defaults]"));
        assert!(toml.contains("[limits]"));
    }

    #[test]
    fn test_load_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[server]\nport = 9000\n\n[defaults]\nquality = 70\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.defaults.quality, 70);
        assert_eq!(config.defaults.max_width, 1920);
    }

    #[test]
    fn test_load_invalid_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[server\nport = ").unwrap();

        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_port_env_override() {
        let mut config = Config::default();
        config.apply_env(Some("3000")).unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.bind_addr(), "0.0.0.0:3000");

        config.apply_env(None).unwrap();
        assert_eq!(config.server.port, 3000);

        let err = config.apply_env(Some("not-a-port")).unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }

    #[test]
    fn test_tilde_expansion() {
        let mut config = Config::default();
        config.server.static_dir = PathBuf::from("~/frontend");
        assert!(!config.static_dir().to_string_lossy().starts_with('~'));
    }
}
