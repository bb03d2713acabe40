//! Configuration types for the GraphBot client.
//!
//! Configuration is resolved once at startup (defaults, then the config
//! file, then environment/flags) and passed down to the backend and the UI.

use serde::{Deserialize, Serialize};
use std::path::Path;
use url::Url;

/// Directory (relative to the working directory) holding config and logs.
pub const GRAPHBOT_DIR: &str = ".graphbot";

/// Config file name inside [`GRAPHBOT_DIR`].
pub const CONFIG_FILE: &str = "config.json";

/// Main configuration for the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Origin of the response-generation service.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// What to do with a response that arrives after the conversation was cleared.
    #[serde(default)]
    pub stale_responses: StaleResponsePolicy,

    /// Default log filter when `GRAPHBOT_LOG` is not set.
    #[serde(default = "default_log_filter")]
    pub log_filter: String,

    /// Color theme for the terminal UI.
    #[serde(default)]
    pub theme: ThemeChoice,
}

fn default_api_base_url() -> String {
    "http://localhost:5001".into()
}

fn default_log_filter() -> String {
    "warn".into()
}

/// Handling of a response whose request predates the latest clear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StaleResponsePolicy {
    /// Release the in-flight gate but append nothing.
    #[default]
    Discard,
    /// Append the response to the cleared list.
    Apply,
}

/// Terminal color theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ThemeChoice {
    /// Catppuccin Mocha (dark).
    #[default]
    Mocha,
    /// Catppuccin Latte (light).
    Latte,
    HighContrast,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            stale_responses: StaleResponsePolicy::default(),
            log_filter: default_log_filter(),
            theme: ThemeChoice::default(),
        }
    }
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        serde_json::from_str(&content).map_err(ConfigError::Parse)
    }

    /// Load configuration from a file, falling back to defaults if it does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to a file.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self).map_err(ConfigError::Serialize)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(ConfigError::Io)?;
        }
        std::fs::write(path, content).map_err(ConfigError::Io)
    }

    /// Override the API base URL (from a flag or environment variable).
    #[must_use]
    pub fn with_api_base_url(mut self, url: Option<String>) -> Self {
        if let Some(url) = url {
            self.api_base_url = url;
        }
        self
    }

    /// Check that the base URL is an absolute http(s) URL.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = Url::parse(&self.api_base_url)
            .map_err(|e| ConfigError::InvalidUrl(self.api_base_url.clone(), e.to_string()))?;
        match url.scheme() {
            "http" | "https" => Ok(()),
            other => Err(ConfigError::InvalidUrl(
                self.api_base_url.clone(),
                format!("unsupported scheme '{other}'"),
            )),
        }
    }

    /// Build an absolute URL for `path` under the API base URL.
    ///
    /// Any path on the base URL is kept (`http://host/api` + `/x` is `http://host/api/x`).
    pub fn endpoint_url(&self, path: &str) -> Result<Url, ConfigError> {
        let base = self.api_base_url.trim_end_matches('/');
        let joined = format!("{base}/{}", path.trim_start_matches('/'));
        Url::parse(&joined).map_err(|e| ConfigError::InvalidUrl(joined, e.to_string()))
    }
}

/// Errors that can occur when working with configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// I/O error reading or writing config.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error parsing config JSON.
    #[error("Parse error: {0}")]
    Parse(#[source] serde_json::Error),

    /// Error serializing config to JSON.
    #[error("Serialize error: {0}")]
    Serialize(#[source] serde_json::Error),

    /// The API base URL is not usable.
    #[error("Invalid API URL '{0}': {1}")]
    InvalidUrl(String, String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.api_base_url, "http://localhost:5001");
        assert_eq!(config.stale_responses, StaleResponsePolicy::Discard);
        assert_eq!(config.log_filter, "warn");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"stale_responses":"apply","theme":"high_contrast"}"#).unwrap();
        assert_eq!(config.api_base_url, "http://localhost:5001");
        assert_eq!(config.stale_responses, StaleResponsePolicy::Apply);
        assert_eq!(config.theme, ThemeChoice::HighContrast);
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(GRAPHBOT_DIR).join(CONFIG_FILE);

        let config = Config::default().with_api_base_url(Some("http://example.test:8080".into()));
        config.save(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_or_default(&dir.path().join("nope.json")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_invalid_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(matches!(Config::load(&path), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_override_keeps_existing_when_none() {
        let config = Config::default().with_api_base_url(None);
        assert_eq!(config.api_base_url, "http://localhost:5001");
    }

    #[test]
    fn test_validate_rejects_bad_urls() {
        let relative = Config::default().with_api_base_url(Some("localhost:5001/x".into()));
        assert!(relative.validate().is_err());

        let ftp = Config::default().with_api_base_url(Some("ftp://example.test".into()));
        assert!(matches!(ftp.validate(), Err(ConfigError::InvalidUrl(..))));
    }

    #[test]
    fn test_endpoint_url_joins_paths() {
        let config = Config::default();
        assert_eq!(
            config.endpoint_url("/generate_response").unwrap().as_str(),
            "http://localhost:5001/generate_response"
        );

        let nested = Config::default().with_api_base_url(Some("http://host/api/".into()));
        assert_eq!(
            nested.endpoint_url("/generated_graphs/1.png").unwrap().as_str(),
            "http://host/api/generated_graphs/1.png"
        );
    }
}
