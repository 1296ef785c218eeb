//! Comment store
//!
//! Holds the result of one full paginated fetch. A `CommentSet` is never
//! patched: a new load builds a new set and the session swaps it in whole.

use super::model::Comment;
use crate::types::{CommentId, VideoId};
use std::collections::HashMap;

/// Ordered comments of one video, in fetch order
#[derive(Debug, Clone)]
pub struct CommentSet {
    /// Video the comments belong to
    video_id: VideoId,
    /// Comments in fetch order
    comments: Vec<Comment>,
    /// Position of each id in `comments`
    index: HashMap<CommentId, usize>,
}

impl CommentSet {
    /// Build a set from fetched comments.
    ///
    /// Ids are unique per video; if pagination ever hands back an id twice the
    /// first occurrence wins.
    pub fn new(video_id: VideoId, fetched: Vec<Comment>) -> Self {
        let mut comments = Vec::with_capacity(fetched.len());
        let mut index = HashMap::with_capacity(fetched.len());

        for comment in fetched {
            if index.contains_key(&comment.id) {
                tracing::debug!("Skipping duplicate comment id {}", comment.id);
                continue;
            }
            index.insert(comment.id.clone(), comments.len());
            comments.push(comment);
        }

        Self {
            video_id,
            comments,
            index,
        }
    }

    /// Video the comments belong to
    pub fn video_id(&self) -> &VideoId {
        &self.video_id
    }

    /// Get a comment by id
    pub fn get(&self, id: &CommentId) -> Option<&Comment> {
        self.index.get(id).map(|&pos| &self.comments[pos])
    }

    /// Check membership
    pub fn contains(&self, id: &CommentId) -> bool {
        self.index.contains_key(id)
    }

    /// Position of a comment in fetch order
    pub fn position(&self, id: &CommentId) -> Option<usize> {
        self.index.get(id).copied()
    }

    /// All comments in fetch order
    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    /// Iterate in fetch order
    pub fn iter(&self) -> std::slice::Iter<'_, Comment> {
        self.comments.iter()
    }

    /// Number of comments
    pub fn len(&self) -> usize {
        self.comments.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.comments.is_empty()
    }
}

impl<'a> IntoIterator for &'a CommentSet {
    type Item = &'a Comment;
    type IntoIter = std::slice::Iter<'a, Comment>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
