//! Comment data models

use crate::types::CommentId;
use serde::{Deserialize, Serialize};

/// A top-level comment on a video, immutable once loaded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    /// Platform-assigned identifier
    pub id: CommentId,
    /// Display name of the author
    pub author: String,
    /// Original comment text
    pub text: String,
}

impl Comment {
    /// Create a comment
    pub fn new(id: impl Into<String>, author: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: CommentId::from_string(id),
            author: author.into(),
            text: text.into(),
        }
    }

    /// Text as the classifier sees it
    pub fn normalized_text(&self) -> String {
        crate::normalize::normalize(&self.text)
    }
}

/// One page of a paginated listing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommentPage {
    /// Comments in platform order
    pub items: Vec<Comment>,
    /// Continuation token, `None` on the last page
    pub next_page_token: Option<String>,
}

impl CommentPage {
    /// Create a page
    pub fn new(items: Vec<Comment>, next_page_token: Option<String>) -> Self {
        Self {
            items,
            next_page_token,
        }
    }

    /// Whether more pages follow
    pub fn has_more(&self) -> bool {
        self.next_page_token
            .as_deref()
            .map(|t| !t.is_empty())
            .unwrap_or(false)
    }
}
