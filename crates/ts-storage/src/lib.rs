//! ts-storage - Storage library for tubesweep
//!
//! This crate provides the on-disk pieces: the append-only activity log, the
//! TOML configuration file, and the default locations of both.

mod activity_log;
mod config_store;
mod paths;

pub use activity_log::{
    activity_layer, level_label, open_activity_writer, read_activity_log, tail_lines,
    ActivityFormat, TIMESTAMP_FORMAT,
};
pub use config_store::ConfigStore;
pub use paths::{AppPaths, CONFIG_FILE, LOG_FILE, MODEL_FILE};
