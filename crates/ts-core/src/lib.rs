//! ts-core - Core library for tubesweep
//!
//! This crate provides the core logic for the YouTube comment moderation tool:
//! the comment model, text normalization, the classifier adapter, the load and
//! removal pipelines, and the seams to the platform API.

pub mod api;
pub mod classifier;
pub mod comment;
pub mod config;
pub mod error;
pub mod normalize;
pub mod pipeline;
pub mod session;
pub mod types;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use error::{ErrorKind, Result, SweepError};
pub use normalize::normalize;
pub use session::Session;
pub use types::*;
