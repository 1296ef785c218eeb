//! AI-assisted removal state machine
//!
//! ```text
//! Idle -> Predicting -> NoneFlagged
//!                    -> PredictionFailed
//!                    -> AwaitingConfirmation -> Cancelled
//!                                            -> Applying -> Done
//!                                                        -> Failed
//! ```
//!
//! The machine never does I/O itself. `begin` hands out a [`PredictionJob`]
//! and `confirm` a [`ModerationBatch`]; the caller runs them wherever it likes
//! (a worker thread, or inline for the CLI) and feeds the results back.

use super::removal::{BatchOutcome, ModerationBatch};
use crate::classifier::Classifier;
use crate::comment::{Comment, CommentSet, FlaggedSet};
use crate::error::{ErrorKind, Result, SweepError};
use crate::session::Session;
use crate::types::CommentId;
use std::sync::Arc;
use tracing::debug;

/// State of one AI-assisted removal
#[derive(Debug, Clone)]
pub enum SweepState {
    /// Nothing in progress
    Idle,
    /// Classifier running over the comment set
    Predicting,
    /// Classifier found nothing
    NoneFlagged,
    /// Flagged comments under human review
    AwaitingConfirmation(FlaggedSet),
    /// Moderation calls in flight
    Applying { total: usize },
    /// Every call succeeded
    Done { removed: usize },
    /// Operator aborted or dismissed every entry
    Cancelled,
    /// Normalization or prediction failed
    PredictionFailed { message: String },
    /// A moderation call failed; earlier calls stay applied
    Failed {
        applied: usize,
        total: usize,
        kind: ErrorKind,
        message: String,
    },
}

impl SweepState {
    /// Whether the run has finished
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SweepState::NoneFlagged
                | SweepState::Done { .. }
                | SweepState::Cancelled
                | SweepState::PredictionFailed { .. }
                | SweepState::Failed { .. }
        )
    }

    /// Short name for logging and the status bar
    pub fn name(&self) -> &'static str {
        match self {
            SweepState::Idle => "idle",
            SweepState::Predicting => "predicting",
            SweepState::NoneFlagged => "none-flagged",
            SweepState::AwaitingConfirmation(_) => "awaiting-confirmation",
            SweepState::Applying { .. } => "applying",
            SweepState::Done { .. } => "done",
            SweepState::Cancelled => "cancelled",
            SweepState::PredictionFailed { .. } => "prediction-failed",
            SweepState::Failed { .. } => "failed",
        }
    }
}

impl Default for SweepState {
    fn default() -> Self {
        SweepState::Idle
    }
}

/// Normalize-and-predict work for one run
#[derive(Clone)]
pub struct PredictionJob {
    comments: Arc<CommentSet>,
    classifier: Arc<dyn Classifier>,
}

impl PredictionJob {
    /// Create a job over a comment snapshot
    pub fn new(comments: Arc<CommentSet>, classifier: Arc<dyn Classifier>) -> Self {
        Self {
            comments,
            classifier,
        }
    }

    /// Comments the job classifies
    pub fn comments(&self) -> &CommentSet {
        &self.comments
    }

    /// Normalize every comment, classify in one batch and collect positives
    pub fn run(&self) -> Result<FlaggedSet> {
        let texts: Vec<String> = self.comments.iter().map(Comment::normalized_text).collect();

        let labels = self.classifier.predict(&texts).map_err(|e| match e {
            SweepError::Prediction(_) => e,
            other => SweepError::Prediction(other.to_string()),
        })?;

        FlaggedSet::from_labels(&self.comments, &labels)
    }
}

/// Driver for the AI-assisted removal state machine
#[derive(Debug, Default)]
pub struct Sweep {
    state: SweepState,
}

impl Sweep {
    /// Create an idle sweep
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state
    pub fn state(&self) -> &SweepState {
        &self.state
    }

    /// Flagged set under review, if any
    pub fn flagged(&self) -> Option<&FlaggedSet> {
        match &self.state {
            SweepState::AwaitingConfirmation(flagged) => Some(flagged),
            _ => None,
        }
    }

    /// Whether a run is between request and outcome
    pub fn is_busy(&self) -> bool {
        matches!(
            self.state,
            SweepState::Predicting
                | SweepState::AwaitingConfirmation(_)
                | SweepState::Applying { .. }
        )
    }

    /// Request AI-assisted removal.
    ///
    /// Returns `None` and stays put when there is no comment set, no
    /// classifier, or a run is already in progress.
    pub fn begin(&mut self, session: &Session) -> Option<PredictionJob> {
        if self.is_busy() {
            debug!("Sweep already {}, ignoring request", self.state.name());
            return None;
        }

        let (Some(comments), Some(classifier)) = (session.comments(), session.classifier()) else {
            return None;
        };

        self.state = SweepState::Predicting;
        Some(PredictionJob::new(comments, classifier))
    }

    /// Feed back the result of a [`PredictionJob`]
    pub fn finish_prediction(&mut self, result: Result<FlaggedSet>) -> &SweepState {
        if !matches!(self.state, SweepState::Predicting) {
            debug!("Dropping prediction result in state {}", self.state.name());
            return &self.state;
        }

        self.state = match result {
            Err(err) => SweepState::PredictionFailed {
                message: err.to_string(),
            },
            Ok(flagged) if flagged.is_empty() => SweepState::NoneFlagged,
            Ok(flagged) => SweepState::AwaitingConfirmation(flagged),
        };
        &self.state
    }

    /// Opt the comment at `index` out of the removal.
    ///
    /// Dismissing the last entry cancels the run.
    pub fn dismiss_at(&mut self, index: usize) -> Option<Comment> {
        let SweepState::AwaitingConfirmation(flagged) = &mut self.state else {
            return None;
        };
        let removed = flagged.dismiss_at(index);
        if flagged.is_empty() {
            self.state = SweepState::Cancelled;
        }
        removed
    }

    /// Opt a comment out of the removal by id
    pub fn dismiss(&mut self, id: &CommentId) -> Option<Comment> {
        let index = self
            .flagged()?
            .iter()
            .position(|c| &c.id == id)?;
        self.dismiss_at(index)
    }

    /// Abort the review without touching anything
    pub fn cancel(&mut self) {
        if matches!(self.state, SweepState::AwaitingConfirmation(_)) {
            self.state = SweepState::Cancelled;
        }
    }

    /// Confirm the reviewed set. `ban_author` is captured here for every call.
    pub fn confirm(&mut self, ban_author: bool) -> Option<ModerationBatch> {
        let SweepState::AwaitingConfirmation(flagged) = &self.state else {
            return None;
        };
        if flagged.is_empty() {
            self.state = SweepState::Cancelled;
            return None;
        }

        let batch = ModerationBatch::from_flagged(flagged, ban_author);
        self.state = SweepState::Applying { total: batch.len() };
        Some(batch)
    }

    /// Feed back the outcome of the confirmed batch
    pub fn finish_apply(&mut self, outcome: BatchOutcome) -> &SweepState {
        if !matches!(self.state, SweepState::Applying { .. }) {
            debug!("Dropping batch outcome in state {}", self.state.name());
            return &self.state;
        }

        self.state = match outcome.error {
            None => SweepState::Done {
                removed: outcome.applied.len(),
            },
            Some(err) => SweepState::Failed {
                applied: outcome.applied.len(),
                total: outcome.total,
                kind: err.kind(),
                message: err.to_string(),
            },
        };
        &self.state
    }

    /// Leave a terminal state
    pub fn reset(&mut self) {
        if self.state.is_terminal() {
            self.state = SweepState::Idle;
        }
    }
}
