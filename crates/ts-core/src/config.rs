//! Configuration management for tubesweep

use crate::api::{MAX_PAGE_SIZE, YOUTUBE_FORCE_SSL_SCOPE};
use crate::error::{Result, SweepError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default API host
pub const DEFAULT_API_BASE_URL: &str = "https://www.googleapis.com";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Authentication settings
    pub auth: AuthConfig,
    /// Comment API settings
    pub api: ApiConfig,
    /// Classifier settings
    pub classifier: ClassifierConfig,
    /// Activity log settings
    pub log: LogConfig,
    /// UI settings
    pub ui: UiConfig,
}

impl Config {
    /// Check values the rest of the program relies on
    pub fn validate(&self) -> Result<()> {
        if self.api.page_size == 0 || self.api.page_size > MAX_PAGE_SIZE {
            return Err(SweepError::Config(format!(
                "api.page_size must be between 1 and {}, got {}",
                MAX_PAGE_SIZE, self.api.page_size
            )));
        }
        if self.auth.scopes.iter().all(|s| s.trim().is_empty()) {
            return Err(SweepError::Config(
                "auth.scopes must list at least one scope".to_string(),
            ));
        }
        if self.api.base_url.trim().is_empty() {
            return Err(SweepError::Config("api.base_url is empty".to_string()));
        }
        Ok(())
    }
}

/// Authentication configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Client secret file pre-filled in the credentials field
    pub credentials_path: Option<PathBuf>,
    /// OAuth scopes requested
    pub scopes: Vec<String>,
    /// Try to open the consent page in a browser
    pub open_browser: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            credentials_path: None,
            scopes: vec![YOUTUBE_FORCE_SSL_SCOPE.to_string()],
            open_browser: true,
        }
    }
}

/// Comment API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Scheme and host of the Data API
    pub base_url: String,
    /// Comment threads per page
    pub page_size: u32,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            page_size: MAX_PAGE_SIZE,
            timeout_secs: 30,
        }
    }
}

/// Classifier configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Model file; defaults to `model.json` in the data directory
    pub model_path: Option<PathBuf>,
    /// Load the model at startup
    pub enabled: bool,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            model_path: None,
            enabled: true,
        }
    }
}

/// Activity log configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Log file; defaults to `activity.log` in the data directory
    pub path: Option<PathBuf>,
}

/// UI-related configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// URL probed for the latency indicator
    pub ping_host: String,
    /// Seconds between probes
    pub ping_interval_secs: u64,
    /// Event poll interval in milliseconds
    pub tick_rate_ms: u64,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            ping_host: DEFAULT_API_BASE_URL.to_string(),
            ping_interval_secs: 5,
            tick_rate_ms: 100,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.api.page_size, 100);
        assert_eq!(config.auth.scopes, vec![YOUTUBE_FORCE_SSL_SCOPE.to_string()]);
        assert!(config.classifier.enabled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml = toml::to_string_pretty(&config).unwrap();
        assert!(toml.contains("[auth]"));
        assert!(toml.contains("[api]"));

        let config2: Config = toml::from_str(&toml).unwrap();
        assert_eq!(config.api.page_size, config2.api.page_size);
        assert_eq!(config.ui.ping_host, config2.ui.ping_host);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: Config = toml::from_str("[api]\npage_size = 50\n").unwrap();
        assert_eq!(config.api.page_size, 50);
        assert_eq!(config.api.base_url, DEFAULT_API_BASE_URL);
        assert_eq!(config.ui.tick_rate_ms, 100);
    }

    #[test]
    fn test_validate_page_size() {
        let mut config = Config::default();
        config.api.page_size = 0;
        assert!(matches!(config.validate(), Err(SweepError::Config(_))));
        config.api.page_size = 101;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_scopes() {
        let mut config = Config::default();
        config.auth.scopes.clear();
        assert!(config.validate().is_err());
    }
}
