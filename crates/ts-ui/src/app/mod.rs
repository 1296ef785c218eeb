//! Application module
//!
//! [`AppState`] holds what the operator sees and turns input into
//! [`Action`]s; [`App`] owns the terminal and runs those actions on worker
//! threads.

mod runner;
mod state;

pub use runner::{App, Services};
pub use state::{Action, AppState, Focus, Latency, Notice, NoticeLevel, Overlay};
