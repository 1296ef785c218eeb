//! In-memory fakes for the platform seams
//!
//! Used by unit tests here and, through the `testing` feature, by the UI and
//! CLI crates.

use crate::api::{Authenticator, CommentApi};
use crate::classifier::{Classifier, Label};
use crate::comment::CommentPage;
use crate::error::{Result, SweepError};
use crate::types::{CommentId, ModerationStatus, VideoId};
use std::path::Path;
use std::sync::{Arc, Mutex};

/// A recorded moderation call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModerationCall {
    pub comment_id: CommentId,
    pub status: ModerationStatus,
    pub ban_author: bool,
}

/// Scripted comment API
#[derive(Debug, Default)]
pub struct FakeApi {
    pages: Vec<CommentPage>,
    fail_list_at: Option<usize>,
    fail_moderation_at: Option<usize>,
    list_calls: Mutex<Vec<(Option<String>, u32)>>,
    moderation_calls: Mutex<Vec<ModerationCall>>,
}

impl FakeApi {
    /// Serve `pages` in order, one per `list_page` call
    pub fn new(pages: Vec<CommentPage>) -> Self {
        Self {
            pages,
            ..Self::default()
        }
    }

    /// Fail the `index`-th (0-based) listing call
    pub fn fail_list_at(mut self, index: usize) -> Self {
        self.fail_list_at = Some(index);
        self
    }

    /// Fail the `index`-th (0-based) moderation call
    pub fn fail_moderation_at(mut self, index: usize) -> Self {
        self.fail_moderation_at = Some(index);
        self
    }

    /// Page tokens passed to `list_page`, in call order
    pub fn list_calls(&self) -> Vec<Option<String>> {
        lock(&self.list_calls).iter().map(|(t, _)| t.clone()).collect()
    }

    /// Page size of the latest listing call
    pub fn last_page_size(&self) -> Option<u32> {
        lock(&self.list_calls).last().map(|(_, size)| *size)
    }

    /// Moderation calls attempted, in call order
    pub fn moderation_calls(&self) -> Vec<ModerationCall> {
        lock(&self.moderation_calls).clone()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn forbidden() -> SweepError {
    SweepError::Transport {
        status: 403,
        reason: "forbidden".to_string(),
        message: "The caller does not have permission".to_string(),
    }
}

impl CommentApi for FakeApi {
    fn list_page(
        &self,
        _video_id: &VideoId,
        page_token: Option<&str>,
        max_results: u32,
    ) -> Result<CommentPage> {
        let mut calls = lock(&self.list_calls);
        let index = calls.len();
        calls.push((page_token.map(str::to_string), max_results));

        if self.fail_list_at == Some(index) {
            return Err(forbidden());
        }
        Ok(self.pages.get(index).cloned().unwrap_or_default())
    }

    fn set_moderation_status(
        &self,
        comment_id: &CommentId,
        status: ModerationStatus,
        ban_author: bool,
    ) -> Result<()> {
        let mut calls = lock(&self.moderation_calls);
        let index = calls.len();
        calls.push(ModerationCall {
            comment_id: comment_id.clone(),
            status,
            ban_author,
        });

        if self.fail_moderation_at == Some(index) {
            return Err(forbidden());
        }
        Ok(())
    }
}

/// Flags every text containing one of its keywords
#[derive(Debug, Default)]
pub struct KeywordClassifier {
    keywords: Vec<String>,
    failure: Option<String>,
    batches: Mutex<Vec<Vec<String>>>,
}

impl KeywordClassifier {
    /// Create a classifier flagging any of `keywords`
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keywords: keywords.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Create a classifier whose every prediction fails
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            ..Self::default()
        }
    }

    /// Batches passed to `predict`
    pub fn batches(&self) -> Vec<Vec<String>> {
        lock(&self.batches).clone()
    }
}

impl Classifier for KeywordClassifier {
    fn name(&self) -> &str {
        "keyword"
    }

    fn predict(&self, texts: &[String]) -> Result<Vec<Label>> {
        lock(&self.batches).push(texts.to_vec());

        if let Some(message) = &self.failure {
            return Err(SweepError::Prediction(message.clone()));
        }

        Ok(texts
            .iter()
            .map(|text| {
                if self.keywords.iter().any(|k| text.contains(k.as_str())) {
                    Label::Flagged
                } else {
                    Label::Clean
                }
            })
            .collect())
    }
}

/// Authenticator handing out a fixed API
pub struct FakeAuthenticator {
    api: Option<Arc<dyn CommentApi>>,
    consent_url: Option<String>,
}

impl FakeAuthenticator {
    /// Succeed with `api`
    pub fn succeeding(api: Arc<dyn CommentApi>) -> Self {
        Self {
            api: Some(api),
            consent_url: None,
        }
    }

    /// Always fail
    pub fn failing() -> Self {
        Self {
            api: None,
            consent_url: None,
        }
    }

    /// Report `url` to the caller before finishing
    pub fn with_consent_url(mut self, url: impl Into<String>) -> Self {
        self.consent_url = Some(url.into());
        self
    }
}

impl Authenticator for FakeAuthenticator {
    fn authenticate(
        &self,
        _credentials: &Path,
        on_consent_url: &mut dyn FnMut(&str),
    ) -> Result<Arc<dyn CommentApi>> {
        if let Some(url) = &self.consent_url {
            on_consent_url(url);
        }
        self.api
            .clone()
            .ok_or_else(|| SweepError::Authentication("access_denied".to_string()))
    }
}
