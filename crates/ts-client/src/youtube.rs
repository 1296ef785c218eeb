//! YouTube Data API v3 comment endpoints

use crate::token::TokenSource;
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::header::CONTENT_LENGTH;
use serde::Deserialize;
use std::fmt;
use tracing::debug;
use ts_core::api::CommentApi;
use ts_core::comment::{Comment, CommentPage};
use ts_core::error::{Result, SweepError};
use ts_core::types::{CommentId, ModerationStatus, VideoId};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThreadListResponse {
    #[serde(default)]
    items: Vec<ThreadItem>,
    #[serde(default)]
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ThreadItem {
    id: String,
    snippet: ThreadSnippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThreadSnippet {
    top_level_comment: TopLevelComment,
}

#[derive(Debug, Deserialize)]
struct TopLevelComment {
    snippet: CommentSnippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommentSnippet {
    #[serde(default)]
    author_display_name: String,
    #[serde(default)]
    text_original: String,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    errors: Vec<ErrorDetail>,
    #[serde(default)]
    status: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    reason: String,
}

/// Parse a `commentThreads.list` response body
pub(crate) fn parse_page(body: &str) -> Result<CommentPage> {
    let response: ThreadListResponse = serde_json::from_str(body)?;
    let items = response
        .items
        .into_iter()
        .map(|item| {
            let snippet = item.snippet.top_level_comment.snippet;
            Comment::new(item.id, snippet.author_display_name, snippet.text_original)
        })
        .collect();
    Ok(CommentPage::new(items, response.next_page_token))
}

/// Map a failed response onto a transport error
pub(crate) fn parse_error(status: u16, body: &str) -> SweepError {
    match serde_json::from_str::<ErrorResponse>(body) {
        Ok(response) => {
            let reason = response
                .error
                .errors
                .into_iter()
                .map(|detail| detail.reason)
                .find(|reason| !reason.is_empty())
                .or(response.error.status)
                .unwrap_or_else(|| "unknown".to_string());
            SweepError::Transport {
                status,
                reason,
                message: response.error.message,
            }
        }
        Err(_) => SweepError::Transport {
            status,
            reason: "unknown".to_string(),
            message: body.chars().take(200).collect(),
        },
    }
}

/// Authorized client for the comment endpoints
pub struct YouTubeClient {
    http: Client,
    base_url: String,
    tokens: TokenSource,
}

impl YouTubeClient {
    /// Client talking to `base_url` (scheme and host) with `tokens`
    pub fn new(http: Client, base_url: &str, tokens: TokenSource) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            tokens,
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/youtube/v3/{}", self.base_url, path)
    }

    fn execute(&self, request: RequestBuilder) -> Result<String> {
        let token = self.tokens.bearer()?;
        let response = request
            .bearer_auth(token)
            .send()
            .map_err(|e| SweepError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|e| SweepError::Network(e.to_string()))?;

        if status.is_success() {
            Ok(body)
        } else {
            Err(parse_error(status.as_u16(), &body))
        }
    }
}

impl fmt::Debug for YouTubeClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("YouTubeClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl CommentApi for YouTubeClient {
    fn list_page(
        &self,
        video_id: &VideoId,
        page_token: Option<&str>,
        max_results: u32,
    ) -> Result<CommentPage> {
        let max_results = max_results.to_string();
        let mut query = vec![
            ("part", "snippet"),
            ("videoId", video_id.as_str()),
            ("maxResults", max_results.as_str()),
        ];
        if let Some(token) = page_token {
            query.push(("pageToken", token));
        }

        debug!("Listing comment threads of {} (page token {:?})", video_id, page_token);
        let body = self.execute(self.http.get(self.endpoint("commentThreads")).query(&query))?;
        parse_page(&body)
    }

    fn set_moderation_status(
        &self,
        comment_id: &CommentId,
        status: ModerationStatus,
        ban_author: bool,
    ) -> Result<()> {
        let mut query = vec![
            ("id", comment_id.as_str()),
            ("moderationStatus", status.as_str()),
        ];
        // The API only accepts banAuthor together with a rejection
        if status == ModerationStatus::Rejected {
            query.push(("banAuthor", if ban_author { "true" } else { "false" }));
        }

        debug!("Setting {} on comment {}", status, comment_id);
        self.execute(
            self.http
                .post(self.endpoint("comments/setModerationStatus"))
                .query(&query)
                .header(CONTENT_LENGTH, "0"),
        )?;
        Ok(())
    }
}
