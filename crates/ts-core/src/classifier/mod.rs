//! Classifier adapter
//!
//! The spam/gambling model is trained offline and consumed here as a batch
//! `predict` over normalized texts.

pub mod linear;

pub use linear::{LinearTextModel, ModelInfo};

use crate::error::Result;

/// Binary classifier output for one text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Label {
    /// Not spam
    Clean,
    /// Spam / gambling promotion
    Flagged,
}

impl Label {
    /// Whether this is a positive prediction
    pub fn is_flagged(&self) -> bool {
        matches!(self, Label::Flagged)
    }
}

/// Trait for pre-trained binary text classifiers
pub trait Classifier: Send + Sync {
    /// Model name for display and logging
    fn name(&self) -> &str;

    /// Label every text, returning exactly one label per input in input order
    fn predict(&self, texts: &[String]) -> Result<Vec<Label>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_is_flagged() {
        assert!(Label::Flagged.is_flagged());
        assert!(!Label::Clean.is_flagged());
    }
}
