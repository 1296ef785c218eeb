//! Load and removal pipelines
//!
//! - [`loader`]: paginated fetch of a video's comments
//! - [`removal`]: moderation intents and fail-fast batches
//! - [`sweep`]: the flag, review, confirm, remove state machine

pub mod loader;
pub mod removal;
pub mod sweep;

pub use loader::{fetch_all, fetch_all_with};
pub use removal::{BatchOutcome, ModerationBatch, ModerationIntent};
pub use sweep::{PredictionJob, Sweep, SweepState};
