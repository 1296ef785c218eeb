//! Flagged comments awaiting review

use super::model::Comment;
use super::store::CommentSet;
use crate::classifier::Label;
use crate::error::{Result, SweepError};
use crate::types::{CommentId, VideoId};

/// Comments the classifier judged positive, in source order.
///
/// Always a subset of the `CommentSet` it was built from with no repeated
/// ids. During review entries can only be dismissed, never added.
#[derive(Debug, Clone)]
pub struct FlaggedSet {
    video_id: VideoId,
    entries: Vec<Comment>,
}

impl FlaggedSet {
    /// Select the positively labelled comments of `source`.
    ///
    /// `labels` must be aligned with `source` by position.
    pub fn from_labels(source: &CommentSet, labels: &[Label]) -> Result<Self> {
        if labels.len() != source.len() {
            return Err(SweepError::Prediction(format!(
                "classifier returned {} labels for {} comments",
                labels.len(),
                source.len()
            )));
        }

        let entries = source
            .iter()
            .zip(labels)
            .filter(|(_, label)| label.is_flagged())
            .map(|(comment, _)| comment.clone())
            .collect();

        Ok(Self {
            video_id: source.video_id().clone(),
            entries,
        })
    }

    /// Opt a comment out of the removal
    pub fn dismiss(&mut self, id: &CommentId) -> Option<Comment> {
        let pos = self.entries.iter().position(|c| &c.id == id)?;
        Some(self.entries.remove(pos))
    }

    /// Opt the comment at `index` out of the removal
    pub fn dismiss_at(&mut self, index: usize) -> Option<Comment> {
        if index < self.entries.len() {
            Some(self.entries.remove(index))
        } else {
            None
        }
    }

    /// Video the flagged comments belong to
    pub fn video_id(&self) -> &VideoId {
        &self.video_id
    }

    /// Flagged comments in source order
    pub fn entries(&self) -> &[Comment] {
        &self.entries
    }

    /// Iterate in source order
    pub fn iter(&self) -> std::slice::Iter<'_, Comment> {
        self.entries.iter()
    }

    /// Number of flagged comments
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
