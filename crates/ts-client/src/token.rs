//! Access tokens and refresh

use crate::credentials::ClientSecret;
use chrono::{DateTime, Duration, Utc};
use reqwest::blocking::Client;
use serde::Deserialize;
use std::sync::Mutex;
use tracing::debug;
use ts_core::error::{Result, SweepError};

/// Tokens are refreshed this long before they actually expire
const EXPIRY_SKEW_SECS: i64 = 60;

/// Token endpoint response
#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

/// Token endpoint error body
#[derive(Debug, Deserialize)]
pub(crate) struct TokenError {
    pub error: String,
    #[serde(default)]
    pub error_description: Option<String>,
}

impl TokenError {
    /// Turn a failed token response into an authentication error
    pub(crate) fn from_body(status: u16, body: &str) -> SweepError {
        match serde_json::from_str::<TokenError>(body) {
            Ok(err) => SweepError::Authentication(match err.error_description {
                Some(desc) => format!("{}: {}", err.error, desc),
                None => err.error,
            }),
            Err(_) => SweepError::Authentication(format!("token endpoint returned {}", status)),
        }
    }
}

/// Bearer token with its expiry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessToken {
    pub token: String,
    pub expires_at: Option<DateTime<Utc>>,
    pub refresh_token: Option<String>,
}

impl AccessToken {
    /// Token that never expires
    pub fn fixed(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            expires_at: None,
            refresh_token: None,
        }
    }

    pub(crate) fn from_response(response: TokenResponse, now: DateTime<Utc>) -> Self {
        Self {
            token: response.access_token,
            expires_at: response.expires_in.map(|secs| now + Duration::seconds(secs)),
            refresh_token: response.refresh_token,
        }
    }

    /// Whether the token should be refreshed before use at `now`
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at {
            Some(at) => now + Duration::seconds(EXPIRY_SKEW_SECS) >= at,
            None => false,
        }
    }
}

/// Hands out a valid bearer token, refreshing it when it expires
#[derive(Debug)]
pub struct TokenSource {
    http: Client,
    secret: Option<ClientSecret>,
    current: Mutex<AccessToken>,
}

impl TokenSource {
    /// Source backed by an OAuth client able to refresh
    pub fn new(http: Client, secret: Option<ClientSecret>, token: AccessToken) -> Self {
        Self {
            http,
            secret,
            current: Mutex::new(token),
        }
    }

    /// Source serving a token as is
    pub fn fixed(http: Client, token: impl Into<String>) -> Self {
        Self::new(http, None, AccessToken::fixed(token))
    }

    /// Current bearer token
    pub fn bearer(&self) -> Result<String> {
        let mut current = self
            .current
            .lock()
            .map_err(|_| SweepError::Unexpected("token lock poisoned".to_string()))?;

        if current.is_expired(Utc::now()) {
            let refreshed = self.refresh(&current)?;
            *current = refreshed;
        }
        Ok(current.token.clone())
    }

    fn refresh(&self, expired: &AccessToken) -> Result<AccessToken> {
        let (Some(secret), Some(refresh_token)) = (&self.secret, &expired.refresh_token) else {
            return Err(SweepError::Authentication(
                "access token expired, authenticate again".to_string(),
            ));
        };

        debug!("Refreshing access token");
        let response = self
            .http
            .post(&secret.token_uri)
            .form(&[
                ("client_id", secret.client_id.as_str()),
                ("client_secret", secret.client_secret.as_str()),
                ("refresh_token", refresh_token.as_str()),
                ("grant_type", "refresh_token"),
            ])
            .send()
            .map_err(|e| SweepError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|e| SweepError::Network(e.to_string()))?;
        if !status.is_success() {
            return Err(TokenError::from_body(status.as_u16(), &body));
        }

        let parsed: TokenResponse = serde_json::from_str(&body)?;
        let mut token = AccessToken::from_response(parsed, Utc::now());
        // Refresh responses usually omit the refresh token
        if token.refresh_token.is_none() {
            token.refresh_token = expired.refresh_token.clone();
        }
        Ok(token)
    }
}
