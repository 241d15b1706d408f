//! Configuration loader for YAML files and environment overrides

use crate::config::types::InstallerConfig;
use crate::errors::{InstallationResult, InstallerError};
use std::env;
use std::path::Path;

/// Environment variable overriding the release feed URL
pub const ENV_FEED_URL: &str = "UXI_FEED_URL";
/// Environment variable overriding the asset extension filter
pub const ENV_ASSET_EXTENSION: &str = "UXI_ASSET_EXTENSION";
/// Environment variable overriding the minimum artifact size
pub const ENV_MIN_ARTIFACT_BYTES: &str = "UXI_MIN_ARTIFACT_BYTES";
/// Environment variable overriding the pinned Python version
pub const ENV_PYTHON_VERSION: &str = "UXI_PYTHON_VERSION";

/// Configuration loader with environment resolution
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load the configuration: defaults, then the optional file, then the environment
    pub fn load(path: Option<&Path>) -> InstallationResult<InstallerConfig> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => InstallerConfig::default(),
        };

        Self::apply_env_overrides(&mut config)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML file
    pub fn from_file(path: &Path) -> InstallationResult<InstallerConfig> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            InstallerError::InvalidConfiguration {
                message: format!("Failed to read config file {}: {}", path.display(), e),
            }
        })?;

        Self::from_str(&content)
    }

    /// Parse configuration from YAML text
    pub fn from_str(content: &str) -> InstallationResult<InstallerConfig> {
        serde_yaml::from_str(content).map_err(|e| InstallerError::InvalidConfiguration {
            message: format!("Failed to parse YAML configuration: {}", e),
        })
    }

    /// Apply `UXI_*` environment overrides on top of `config`
    pub fn apply_env_overrides(config: &mut InstallerConfig) -> InstallationResult<()> {
        if let Ok(url) = env::var(ENV_FEED_URL) {
            log::debug!("Release feed overridden by {}: {}", ENV_FEED_URL, url);
            config.feed.url = url;
        }
        if let Ok(extension) = env::var(ENV_ASSET_EXTENSION) {
            config.feed.asset_extension = extension;
        }
        if let Ok(raw) = env::var(ENV_MIN_ARTIFACT_BYTES) {
            config.feed.min_artifact_bytes =
                raw.trim()
                    .parse()
                    .map_err(|e| InstallerError::InvalidConfiguration {
                        message: format!(
                            "{} must be a byte count, got '{}': {}",
                            ENV_MIN_ARTIFACT_BYTES, raw, e
                        ),
                    })?;
        }
        if let Ok(version) = env::var(ENV_PYTHON_VERSION) {
            config.product.python_version = version;
        }
        Ok(())
    }
}

impl InstallerConfig {
    /// Validate the configuration
    pub fn validate(&self) -> InstallationResult<()> {
        let required = [
            ("product.name", &self.product.name),
            ("product.tag", &self.product.tag),
            ("product.env_name", &self.product.env_name),
            ("product.python_version", &self.product.python_version),
            ("feed.url", &self.feed.url),
            ("runtime_manager.executable", &self.runtime_manager.executable),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(invalid(format!("{} cannot be empty", field)));
            }
        }

        if !self.feed.url.starts_with("http://") && !self.feed.url.starts_with("https://") {
            return Err(invalid(format!(
                "feed.url must be an http(s) URL, got '{}'",
                self.feed.url
            )));
        }
        if !self.feed.asset_extension.starts_with('.') {
            return Err(invalid(format!(
                "feed.asset_extension must start with '.', got '{}'",
                self.feed.asset_extension
            )));
        }
        if self.feed.min_artifact_bytes == 0 {
            return Err(invalid("feed.min_artifact_bytes must be greater than zero"));
        }
        if self.feed.api_timeout_secs == 0 || self.feed.download_timeout_secs == 0 {
            return Err(invalid("feed timeouts must be greater than zero"));
        }
        if self.product.env_name.contains(['/', '\\']) {
            return Err(invalid("product.env_name must be a single directory name"));
        }

        Ok(())
    }
}

fn invalid(message: impl Into<String>) -> InstallerError {
    InstallerError::InvalidConfiguration {
        message: message.into(),
    }
}
