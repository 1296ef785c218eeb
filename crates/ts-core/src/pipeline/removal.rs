//! Moderation calls
//!
//! Every removal, manual or AI-assisted, is a sequence of `rejected` status
//! changes issued one after another. The first failure stops the sequence and
//! nothing is retried; calls that already went through stay applied.

use crate::api::CommentApi;
use crate::comment::FlaggedSet;
use crate::error::{Result, SweepError};
use crate::types::{CommentId, ModerationStatus};
use tracing::debug;

/// One removal to perform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModerationIntent {
    /// Comment to reject
    pub comment_id: CommentId,
    /// Ban the author as well
    pub ban_author: bool,
}

impl ModerationIntent {
    /// Create an intent
    pub fn new(comment_id: CommentId, ban_author: bool) -> Self {
        Self {
            comment_id,
            ban_author,
        }
    }

    /// Validate operator input into an intent. Fails before any network work.
    pub fn from_input(input: &str, ban_author: bool) -> Result<Self> {
        let comment_id = CommentId::parse(input)?;
        Ok(Self::new(comment_id, ban_author))
    }

    /// Issue the moderation call
    pub fn apply(&self, api: &dyn CommentApi) -> Result<()> {
        debug!(
            "Rejecting comment {} (ban_author={})",
            self.comment_id, self.ban_author
        );
        api.set_moderation_status(&self.comment_id, ModerationStatus::Rejected, self.ban_author)
    }
}

/// Confirmed removals, applied in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModerationBatch {
    intents: Vec<ModerationIntent>,
}

impl ModerationBatch {
    /// Build the batch for a reviewed flagged set. `ban_author` is captured
    /// once and applies to every entry.
    pub fn from_flagged(flagged: &FlaggedSet, ban_author: bool) -> Self {
        Self {
            intents: flagged
                .iter()
                .map(|c| ModerationIntent::new(c.id.clone(), ban_author))
                .collect(),
        }
    }

    /// Intents in application order
    pub fn intents(&self) -> &[ModerationIntent] {
        &self.intents
    }

    /// Number of calls the batch will issue
    pub fn len(&self) -> usize {
        self.intents.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.intents.is_empty()
    }

    /// Apply sequentially, stopping at the first error
    pub fn apply(&self, api: &dyn CommentApi) -> BatchOutcome {
        let mut applied = Vec::with_capacity(self.intents.len());

        for intent in &self.intents {
            if let Err(error) = intent.apply(api) {
                return BatchOutcome {
                    total: self.intents.len(),
                    applied,
                    error: Some(error),
                };
            }
            applied.push(intent.comment_id.clone());
        }

        BatchOutcome {
            total: self.intents.len(),
            applied,
            error: None,
        }
    }
}

/// Result of applying a batch
#[derive(Debug)]
pub struct BatchOutcome {
    /// Calls the batch would have issued
    pub total: usize,
    /// Comments rejected before the batch stopped
    pub applied: Vec<CommentId>,
    /// Error that stopped the batch
    pub error: Option<SweepError>,
}

impl BatchOutcome {
    /// Whether every call succeeded
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    /// Number of comments removed
    pub fn removed(&self) -> usize {
        self.applied.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::Label;
    use crate::comment::{Comment, CommentSet};
    use crate::error::ErrorKind;
    use crate::testing::FakeApi;
    use crate::types::VideoId;
    use pretty_assertions::assert_eq;

    fn flagged(ids: &[&str]) -> FlaggedSet {
        let source = CommentSet::new(
            VideoId::from_url("https://youtu.be/dQw4w9WgXcQ").unwrap(),
            ids.iter().map(|id| Comment::new(*id, "spammer", "casino")).collect(),
        );
        FlaggedSet::from_labels(&source, &vec![Label::Flagged; ids.len()]).unwrap()
    }

    #[test]
    fn test_manual_intent_validates_input() {
        let intent = ModerationIntent::from_input("Ugz123", true).unwrap();
        assert_eq!(intent.comment_id.as_str(), "Ugz123");
        assert!(intent.ban_author);

        let err = ModerationIntent::from_input("*Id", false).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_intent_apply_rejects() {
        let api = FakeApi::new(vec![]);
        ModerationIntent::new(CommentId::from_string("Ug1"), false)
            .apply(&api)
            .unwrap();

        let calls = api.moderation_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].status, ModerationStatus::Rejected);
        assert!(!calls[0].ban_author);
    }

    #[test]
    fn test_batch_applies_in_order_with_captured_ban_flag() {
        let api = FakeApi::new(vec![]);
        let batch = ModerationBatch::from_flagged(&flagged(&["Ug1", "Ug2"]), true);

        let outcome = batch.apply(&api);
        assert!(outcome.is_success());
        assert_eq!(outcome.removed(), 2);

        let calls = api.moderation_calls();
        let ids: Vec<_> = calls.iter().map(|c| c.comment_id.as_str()).collect();
        assert_eq!(ids, vec!["Ug1", "Ug2"]);
        assert!(calls.iter().all(|c| c.ban_author));
    }

    #[test]
    fn test_batch_stops_at_first_failure() {
        let api = FakeApi::new(vec![]).fail_moderation_at(0);
        let batch = ModerationBatch::from_flagged(&flagged(&["Ug1", "Ug2"]), false);

        let outcome = batch.apply(&api);
        assert!(!outcome.is_success());
        assert_eq!(outcome.removed(), 0);
        assert_eq!(outcome.total, 2);
        assert_eq!(api.moderation_calls().len(), 1);
        assert_eq!(
            outcome.error.as_ref().map(SweepError::kind),
            Some(ErrorKind::Transport)
        );
    }

    #[test]
    fn test_batch_partial_application() {
        let api = FakeApi::new(vec![]).fail_moderation_at(1);
        let batch = ModerationBatch::from_flagged(&flagged(&["Ug1", "Ug2", "Ug3"]), false);

        let outcome = batch.apply(&api);
        assert_eq!(outcome.applied, vec![CommentId::from_string("Ug1")]);
        assert_eq!(api.moderation_calls().len(), 2);
    }
}
