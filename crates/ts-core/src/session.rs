//! Operator session
//!
//! Explicit owner of everything the remove and load operations read: the
//! authorized API handle, the current comment set, the classifier and the
//! removal toggles. Components receive the session by reference instead of
//! reaching into each other.

use crate::api::CommentApi;
use crate::classifier::Classifier;
use crate::comment::CommentSet;
use crate::error::{Result, SweepError};
use std::fmt;
use std::sync::Arc;

/// Process-wide state of one operator session
#[derive(Default)]
pub struct Session {
    /// Authorized API handle
    api: Option<Arc<dyn CommentApi>>,
    /// Name of the credentials file the handle came from
    credentials_name: Option<String>,
    /// Most recently loaded comments
    comments: Option<Arc<CommentSet>>,
    /// Pre-trained classifier, absent when the model failed to load
    classifier: Option<Arc<dyn Classifier>>,
    /// Ban the author on every removal
    pub ban_author: bool,
    /// Use the classifier instead of an explicit comment id
    pub ai_assisted: bool,
}

impl Session {
    /// Create a session with an optional classifier
    pub fn new(classifier: Option<Arc<dyn Classifier>>) -> Self {
        Self {
            classifier,
            ..Self::default()
        }
    }

    /// Install a freshly authorized API handle
    pub fn set_api(&mut self, api: Arc<dyn CommentApi>, credentials_name: impl Into<String>) {
        self.api = Some(api);
        self.credentials_name = Some(credentials_name.into());
    }

    /// Current API handle
    pub fn api(&self) -> Option<Arc<dyn CommentApi>> {
        self.api.clone()
    }

    /// Current API handle, or the error shown when the operator skipped auth
    pub fn require_api(&self) -> Result<Arc<dyn CommentApi>> {
        self.api()
            .ok_or_else(|| SweepError::validation("Authenticate first!"))
    }

    /// Whether an API handle is installed
    pub fn is_authenticated(&self) -> bool {
        self.api.is_some()
    }

    /// Name of the credentials file used for the current handle
    pub fn credentials_name(&self) -> Option<&str> {
        self.credentials_name.as_deref()
    }

    /// Swap in a newly loaded comment set, dropping the previous one
    pub fn replace_comments(&mut self, comments: CommentSet) {
        self.comments = Some(Arc::new(comments));
    }

    /// Current comment set
    pub fn comments(&self) -> Option<Arc<CommentSet>> {
        self.comments.clone()
    }

    /// Current classifier
    pub fn classifier(&self) -> Option<Arc<dyn Classifier>> {
        self.classifier.clone()
    }

    /// Whether AI-assisted removal can run at all
    pub fn has_classifier(&self) -> bool {
        self.classifier.is_some()
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("authenticated", &self.api.is_some())
            .field("credentials_name", &self.credentials_name)
            .field("comments", &self.comments.as_ref().map(|c| c.len()))
            .field("classifier", &self.classifier.as_ref().map(|c| c.name().to_string()))
            .field("ban_author", &self.ban_author)
            .field("ai_assisted", &self.ai_assisted)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comment::Comment;
    use crate::testing::{FakeApi, KeywordClassifier};
    use crate::types::VideoId;

    #[test]
    fn test_require_api_before_auth() {
        let session = Session::new(None);
        let err = session.require_api().err().unwrap();
        assert_eq!(err.to_string(), "Authenticate first!");
        assert!(!session.is_authenticated());
    }

    #[test]
    fn test_set_api() {
        let mut session = Session::new(None);
        session.set_api(Arc::new(FakeApi::new(vec![])), "client_secret.json");
        assert!(session.require_api().is_ok());
        assert_eq!(session.credentials_name(), Some("client_secret.json"));
    }

    #[test]
    fn test_replace_comments_is_wholesale() {
        let video = VideoId::from_url("https://youtu.be/dQw4w9WgXcQ").unwrap();
        let mut session = Session::new(Some(Arc::new(KeywordClassifier::new(["casino"]))));
        assert!(session.has_classifier());

        session.replace_comments(CommentSet::new(
            video.clone(),
            vec![Comment::new("Ug1", "a", "x"), Comment::new("Ug2", "b", "y")],
        ));
        let first = session.comments().unwrap();

        session.replace_comments(CommentSet::new(video, vec![Comment::new("Ug3", "c", "z")]));
        let second = session.comments().unwrap();

        assert_eq!(first.len(), 2);
        assert_eq!(second.len(), 1);
        assert_eq!(second.comments()[0].id.as_str(), "Ug3");
    }
}
