//! Connectivity probe for the status footer

use crate::http_client;
use reqwest::blocking::Client;
use std::time::{Duration, Instant};
use ts_core::error::Result;

/// Measures the round trip of a `HEAD` request
#[derive(Debug, Clone)]
pub struct LatencyProbe {
    http: Client,
    url: String,
}

impl LatencyProbe {
    /// Probe `url`, giving up after `timeout`
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        Ok(Self {
            http: http_client(timeout)?,
            url: url.into(),
        })
    }

    /// URL being probed
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Round trip time, or `None` when the host is unreachable.
    ///
    /// Any HTTP response counts as reachable.
    pub fn measure(&self) -> Option<Duration> {
        let start = Instant::now();
        self.http.head(&self.url).send().ok().map(|_| start.elapsed())
    }
}
