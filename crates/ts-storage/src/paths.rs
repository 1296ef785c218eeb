//! Default file locations

use std::path::{Path, PathBuf};
use ts_core::config::Config;

/// Name of the configuration file
pub const CONFIG_FILE: &str = "config.toml";
/// Name of the activity log file
pub const LOG_FILE: &str = "activity.log";
/// Name of the classifier model file
pub const MODEL_FILE: &str = "model.json";

/// Resolved locations of everything tubesweep keeps on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppPaths {
    /// Directory holding the configuration file
    pub config_dir: PathBuf,
    /// Directory holding the log and the model
    pub data_dir: PathBuf,
}

impl AppPaths {
    /// Use one directory for everything
    pub fn from_base(base_dir: impl Into<PathBuf>) -> Self {
        let base_dir = base_dir.into();
        Self {
            config_dir: base_dir.clone(),
            data_dir: base_dir,
        }
    }

    /// Platform directories, or ~/.tubesweep when they cannot be determined
    pub fn default_location() -> Self {
        match directories::ProjectDirs::from("com", "tubesweep", "tubesweep") {
            Some(dirs) => Self {
                config_dir: dirs.config_dir().to_path_buf(),
                data_dir: dirs.data_dir().to_path_buf(),
            },
            None => Self::from_base(
                dirs::home_dir()
                    .unwrap_or_else(|| PathBuf::from("."))
                    .join(".tubesweep"),
            ),
        }
    }

    /// Default configuration file
    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join(CONFIG_FILE)
    }

    /// Activity log, honouring `[log] path`
    pub fn log_file(&self, config: &Config) -> PathBuf {
        resolve(&self.data_dir, config.log.path.as_deref(), LOG_FILE)
    }

    /// Classifier model, honouring `[classifier] model_path`
    pub fn model_file(&self, config: &Config) -> PathBuf {
        resolve(&self.data_dir, config.classifier.model_path.as_deref(), MODEL_FILE)
    }
}

fn resolve(base: &Path, configured: Option<&Path>, default_name: &str) -> PathBuf {
    match configured {
        Some(path) if path.is_absolute() => path.to_path_buf(),
        Some(path) => base.join(path),
        None => base.join(default_name),
    }
}
