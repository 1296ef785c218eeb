//! TOML configuration file

use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use ts_core::config::Config;
use ts_core::error::{Result, SweepError};

/// Loads and saves the configuration file
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    /// Store backed by `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the file exists
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Load and validate. A missing file yields the defaults.
    pub fn load(&self) -> Result<Config> {
        if !self.path.exists() {
            debug!("No config at {:?}, using defaults", self.path);
            return Ok(Config::default());
        }

        let content = fs::read_to_string(&self.path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| SweepError::Toml(format!("{}: {}", self.path.display(), e)))?;
        config.validate()?;

        debug!("Loaded config from {:?}", self.path);
        Ok(config)
    }

    /// Write `config`, creating the parent directory
    pub fn save(&self, config: &Config) -> Result<()> {
        config.validate()?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let content =
            toml::to_string_pretty(config).map_err(|e| SweepError::Toml(e.to_string()))?;
        fs::write(&self.path, content)?;

        debug!("Saved config to {:?}", self.path);
        Ok(())
    }
}
