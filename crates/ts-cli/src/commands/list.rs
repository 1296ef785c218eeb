//! List command
//!
//! Authenticate, load every comment of a video and print them.

use super::{authenticate, credentials_path, AppContext};
use anyhow::Result;
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;
use ts_core::api::CommentApi;
use ts_core::comment::CommentSet;
use ts_core::error::ErrorKind;
use ts_core::pipeline::fetch_all_with;
use ts_core::types::VideoId;

/// Arguments for the list command
#[derive(Debug, Args)]
pub struct ListArgs {
    /// Video URL
    pub video_url: String,

    /// OAuth client secret file
    #[arg(long)]
    pub credentials: Option<PathBuf>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Execute the list command
pub fn execute(args: ListArgs, ctx: &AppContext) -> Result<()> {
    use colored::Colorize;

    // Fail on bad input before opening a browser
    let video_id = VideoId::from_url(&args.video_url)?;
    let credentials = credentials_path(&ctx.config, args.credentials)?;
    let api = authenticate(&ctx.config, &credentials)?;

    let comments = load_with_spinner(api.as_ref(), &video_id, ctx.config.api.page_size)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(comments.comments())?);
        return Ok(());
    }

    if comments.is_empty() {
        println!("No comment found.");
        return Ok(());
    }

    for comment in comments.iter() {
        println!(
            "{}  {}  {}",
            comment.id.to_string().yellow(),
            comment.author.cyan(),
            comment.text.split_whitespace().collect::<Vec<_>>().join(" ")
        );
    }
    Ok(())
}

/// Load every comment of `video_id` behind a spinner
pub(crate) fn load_with_spinner(
    api: &dyn CommentApi,
    video_id: &VideoId,
    page_size: u32,
) -> Result<CommentSet> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner.set_message(format!("Loading comments of {}...", video_id));

    let result = fetch_all_with(api, video_id, page_size, |pages, comments| {
        spinner.set_message(format!(
            "Loading comments of {}: {} page(s), {} comment(s)",
            video_id, pages, comments
        ));
    });
    spinner.finish_and_clear();

    match result {
        Ok(set) => {
            if !set.is_empty() {
                info!("Loaded {} comment(s).", set.len());
            }
            Ok(set)
        }
        Err(e) if e.kind() == ErrorKind::Transport => {
            Err(anyhow::Error::new(e).context("Failed to load comments"))
        }
        Err(e) => Err(e.into()),
    }
}
