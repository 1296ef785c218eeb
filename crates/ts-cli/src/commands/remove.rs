//! Remove command
//!
//! Reject one comment by id.

use super::{authenticate, credentials_path, AppContext};
use anyhow::Result;
use clap::Args;
use std::path::PathBuf;
use tracing::info;
use ts_core::api::CommentApi;
use ts_core::error::ErrorKind;
use ts_core::pipeline::ModerationIntent;

/// Arguments for the remove command
#[derive(Debug, Args)]
pub struct RemoveArgs {
    /// Comment id (anything containing one, e.g. a copied "id: Ugx..." line)
    pub comment_id: String,

    /// Ban the author as well
    #[arg(long)]
    pub ban_author: bool,

    /// OAuth client secret file
    #[arg(long)]
    pub credentials: Option<PathBuf>,
}

/// Execute the remove command
pub fn execute(args: RemoveArgs, ctx: &AppContext) -> Result<()> {
    // Validate before any network work
    let intent = ModerationIntent::from_input(&args.comment_id, args.ban_author)?;
    let credentials = credentials_path(&ctx.config, args.credentials)?;
    let api = authenticate(&ctx.config, &credentials)?;

    apply(api.as_ref(), &intent)
}

/// Apply one removal and report it
pub(crate) fn apply(api: &dyn CommentApi, intent: &ModerationIntent) -> Result<()> {
    use colored::Colorize;

    match intent.apply(api) {
        Ok(()) => {
            info!("Removed comment with id: {}", intent.comment_id);
            println!(
                "{} Removed comment with id: {}",
                "✓".green(),
                intent.comment_id.to_string().yellow()
            );
            Ok(())
        }
        Err(e) if e.kind() == ErrorKind::Transport => {
            Err(anyhow::Error::new(e).context("Failed to remove comments"))
        }
        Err(e) => Err(e.into()),
    }
}
