//! Core type definitions for tubesweep

use crate::error::{Result, SweepError};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

/// Pattern for the 11-character video id inside a watch/share URL
pub const VIDEO_ID_PATTERN: &str = r"(?:v=|/)([0-9A-Za-z_-]{11})";

/// Pattern for a top-level comment thread id
pub const COMMENT_ID_PATTERN: &str = r"Ug[\w-]+";

static VIDEO_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(VIDEO_ID_PATTERN).expect("valid video id pattern"));

static COMMENT_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(COMMENT_ID_PATTERN).expect("valid comment id pattern"));

/// Identifier of a video on the platform
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VideoId(String);

impl VideoId {
    /// Extract the video id from a URL (or anything containing `v=<id>` or `/<id>`)
    pub fn from_url(input: &str) -> Result<Self> {
        VIDEO_ID_RE
            .captures(input)
            .and_then(|caps| caps.get(1))
            .map(|m| VideoId(m.as_str().to_string()))
            .ok_or_else(|| SweepError::validation("Enter a valid YouTube URL!"))
    }

    /// Get the string value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Platform-assigned comment identifier, unique per video
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommentId(pub String);

impl CommentId {
    /// Wrap an id as returned by the API, without validation
    pub fn from_string(s: impl Into<String>) -> Self {
        CommentId(s.into())
    }

    /// Parse operator input, keeping the first token that looks like a comment id
    pub fn parse(input: &str) -> Result<Self> {
        COMMENT_ID_RE
            .find(input)
            .map(|m| CommentId(m.as_str().to_string()))
            .ok_or_else(|| SweepError::validation("Enter a valid comment id!"))
    }

    /// Get the string value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CommentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Moderation status applied to a comment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ModerationStatus {
    /// Hidden from public view
    Rejected,
}

impl ModerationStatus {
    /// Wire value used by the API
    pub fn as_str(&self) -> &'static str {
        match self {
            ModerationStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for ModerationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
