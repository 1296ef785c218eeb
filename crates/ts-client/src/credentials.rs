//! OAuth client secret file
//!
//! The file downloaded from the Google Cloud console wraps the client under
//! an `installed` (desktop app) or `web` key.

use serde::Deserialize;
use std::fs;
use std::path::Path;
use ts_core::error::{Result, SweepError};

const DEFAULT_AUTH_URI: &str = "https://accounts.google.com/o/oauth2/auth";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

fn default_auth_uri() -> String {
    DEFAULT_AUTH_URI.to_string()
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

/// OAuth client registration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClientSecret {
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
    #[serde(default = "default_auth_uri")]
    pub auth_uri: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

#[derive(Deserialize)]
struct SecretFile {
    installed: Option<ClientSecret>,
    web: Option<ClientSecret>,
}

impl ClientSecret {
    /// Read a client secret file
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(SweepError::FileNotFound(path.to_path_buf()));
        }
        let content = fs::read_to_string(path)?;
        Self::parse(&content).map_err(|e| e.with_context(path.display().to_string()))
    }

    /// Parse the JSON content of a client secret file
    pub fn parse(content: &str) -> Result<Self> {
        let file: SecretFile = serde_json::from_str(content).map_err(|e| {
            SweepError::Authentication(format!("invalid client secret file: {}", e))
        })?;

        let secret = file.installed.or(file.web).ok_or_else(|| {
            SweepError::Authentication(
                "client secret file has neither an 'installed' nor a 'web' client".to_string(),
            )
        })?;

        if secret.client_id.trim().is_empty() {
            return Err(SweepError::Authentication(
                "client secret file has an empty client_id".to_string(),
            ));
        }
        Ok(secret)
    }
}
