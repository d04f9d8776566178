use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::controller::{ControllerOptions, ResponseOrdering};
use crate::service::validate_base_url;

/// Environment variable holding the backend base URL
pub const BACKEND_URL_ENV: &str = "REELGRAB_BACKEND_URL";

/// Backend used when nothing else is configured
pub const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:4000";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Download backend settings
    pub backend: BackendConfig,

    /// Application settings
    pub app: AppConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Base URL; `/download/{type}` is appended
    pub base_url: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Where saved artifacts go (current directory if unset)
    pub save_dir: Option<PathBuf>,

    /// Which response wins when requests overlap
    pub response_ordering: ResponseOrdering,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BACKEND_URL.to_string(),
            timeout_secs: 300,
        }
    }
}

impl Config {
    /// Load configuration from file, falling back to defaults
    pub async fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::debug!("No config file at {}, using defaults", config_path.display());
            Ok(Self::default())
        }
    }

    /// Load and validate a specific config file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs_err::read_to_string(path).context("Failed to read config file")?;
        let config = Self::from_yaml(&content)?;
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(content).context("Failed to parse config file")?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub async fn save(&self) -> Result<PathBuf> {
        let config_path = Self::config_path()?;
        self.save_to(&config_path)?;
        Ok(config_path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs_err::create_dir_all(parent)?;
        }

        let content = serde_yaml::to_string(self).context("Failed to serialize config")?;

        fs_err::write(path, content).context("Failed to write config file")?;

        Ok(())
    }

    /// Get configuration file path
    pub fn config_path() -> Result<PathBuf> {
        let local_config = PathBuf::from("config.yaml");
        if local_config.exists() {
            return Ok(local_config);
        }

        let config_dir = dirs::config_dir().context("Could not determine config directory")?;

        Ok(config_dir.join("reelgrab").join("config.yaml"))
    }

    /// Replace the backend URL when one was given on the command line or in the environment
    pub fn with_backend_override(mut self, base_url: Option<&str>) -> Result<Self> {
        if let Some(url) = base_url.map(str::trim).filter(|url| !url.is_empty()) {
            self.backend.base_url = url.to_string();
            self.validate()?;
        }
        Ok(self)
    }

    pub fn with_save_dir(mut self, save_dir: Option<PathBuf>) -> Self {
        if save_dir.is_some() {
            self.app.save_dir = save_dir;
        }
        self
    }

    fn validate(&self) -> Result<()> {
        validate_base_url(&self.backend.base_url)?;

        if self.backend.timeout_secs == 0 {
            anyhow::bail!("backend.timeout_secs must be greater than zero");
        }

        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.backend.timeout_secs)
    }

    pub fn controller_options(&self) -> ControllerOptions {
        ControllerOptions {
            ordering: self.app.response_ordering,
            save_dir: self.app.save_dir.clone().unwrap_or_else(|| PathBuf::from(".")),
            workspace_parent: None,
        }
    }

    /// Display current configuration
    pub fn display(&self) {
        println!("Current Configuration:");
        println!("  Backend URL: {}", self.backend.base_url);
        println!("  Timeout: {}s", self.backend.timeout_secs);
        match &self.app.save_dir {
            Some(dir) => println!("  Save Directory: {}", dir.display()),
            None => println!("  Save Directory: (current directory)"),
        }
        println!("  Response Ordering: {:?}", self.app.response_ordering);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.backend.base_url, "http://127.0.0.1:4000");
        assert_eq!(config.app.response_ordering, ResponseOrdering::LastResolved);
        assert_eq!(config.controller_options().save_dir, PathBuf::from("."));
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = Config::from_yaml("app:\n  response_ordering: last_initiated\n").unwrap();
        assert_eq!(config.backend.base_url, DEFAULT_BACKEND_URL);
        assert_eq!(config.backend.timeout_secs, 300);
        assert_eq!(config.app.response_ordering, ResponseOrdering::LastInitiated);
    }

    #[test]
    fn test_invalid_backend_rejected() {
        assert!(Config::from_yaml("backend:\n  base_url: ftp://files.example.com\n").is_err());
        assert!(Config::from_yaml("backend:\n  timeout_secs: 0\n").is_err());
    }

    #[test]
    fn test_override_beats_file() {
        let config = Config::from_yaml("backend:\n  base_url: http://10.0.0.5:4000\n")
            .unwrap()
            .with_backend_override(Some("https://reels.example.com/"))
            .unwrap();
        assert_eq!(config.backend.base_url, "https://reels.example.com/");

        let untouched = Config::default().with_backend_override(Some("  ")).unwrap();
        assert_eq!(untouched.backend.base_url, DEFAULT_BACKEND_URL);

        assert!(Config::default().with_backend_override(Some("localhost")).is_err());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.yaml");

        let config = Config::default().with_save_dir(Some(PathBuf::from("/tmp/reels")));
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.app.save_dir, Some(PathBuf::from("/tmp/reels")));
    }
}
