//! ts-client - YouTube Data API access for tubesweep
//!
//! Production implementations of the `ts_core::api` seams:
//! [`YouTubeClient`] speaks the comment endpoints over HTTPS and
//! [`OAuthAuthenticator`] runs the installed-app OAuth flow that produces it.

mod auth;
mod credentials;
mod probe;
mod token;
mod youtube;

pub use auth::{consent_url, parse_redirect, OAuthAuthenticator};
pub use credentials::ClientSecret;
pub use probe::LatencyProbe;
pub use token::{AccessToken, TokenSource};
pub use youtube::YouTubeClient;

use std::time::Duration;
use ts_core::error::{Result, SweepError};

/// Build the blocking HTTP client shared by the API, token and probe calls
pub(crate) fn http_client(timeout: Duration) -> Result<reqwest::blocking::Client> {
    reqwest::blocking::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("tubesweep/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| SweepError::Network(format!("failed to build HTTP client: {}", e)))
}
