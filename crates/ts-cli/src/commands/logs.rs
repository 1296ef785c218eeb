//! Logs command
//!
//! Print the activity log.

use super::AppContext;
use anyhow::Result;
use clap::Args;
use ts_storage::{read_activity_log, tail_lines};

/// Arguments for the logs command
#[derive(Debug, Args)]
pub struct LogsArgs {
    /// Only print the last N lines
    #[arg(long, short = 'n')]
    pub tail: Option<usize>,

    /// Print the log location instead
    #[arg(long)]
    pub path: bool,
}

/// Execute the logs command
pub fn execute(args: LogsArgs, ctx: &AppContext) -> Result<()> {
    if args.path {
        println!("{}", ctx.log_path.display());
        return Ok(());
    }

    match read_activity_log(&ctx.log_path)? {
        Some(content) => {
            let shown = match args.tail {
                Some(count) => tail_lines(&content, count),
                None => content.as_str(),
            };
            print!("{}", shown);
        }
        None => println!("No log file found."),
    }
    Ok(())
}
