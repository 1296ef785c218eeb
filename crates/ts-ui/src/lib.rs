//! ts-ui - TUI library for tubesweep
//!
//! This crate provides the Terminal User Interface for comment removal.
//!
//! # Overview
//!
//! The TUI provides:
//! - Credential flow with the consent URL shown while waiting
//! - Comment loading with page progress
//! - Manual removal by comment id
//! - AI-assisted removal with a review popup before anything is rejected
//! - Log viewer and a connectivity indicator in the footer
//!
//! Network and classifier work runs on background threads and reports back
//! over a channel, so the screen keeps redrawing while it runs.
//!
//! # Example
//!
//! ```ignore
//! use ts_ui::{App, AppState, Services};
//! use ts_core::Session;
//!
//! let mut app = App::new(AppState::new(Session::new(None)), services)?;
//! app.run()?;
//! ```

pub mod app;
pub mod events;
pub mod input;
pub mod layout;
pub mod render;
pub mod theme;
pub mod worker;

pub use app::{Action, App, AppState, Services};
