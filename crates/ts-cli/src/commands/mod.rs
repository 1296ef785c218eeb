//! CLI commands module
//!
//! This module contains all CLI command implementations.

pub mod config;
pub mod doctor;
pub mod list;
pub mod logs;
pub mod remove;
pub mod sweep;
pub mod tui;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, Level};
use tracing_appender::non_blocking::WorkerGuard;
use ts_client::OAuthAuthenticator;
use ts_core::api::{Authenticator, CommentApi};
use ts_core::classifier::{Classifier, LinearTextModel};
use ts_core::config::Config;
use ts_core::SweepError;
use ts_storage::{AppPaths, ConfigStore};

/// Target of error reports that go to the activity log only
pub(crate) const REPORT_TARGET: &str = "tubesweep::report";

/// tubesweep - remove gambling spam from your YouTube comments
#[derive(Debug, Parser)]
#[command(name = "tubesweep")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true, env = "TUBESWEEP_CONFIG")]
    pub config: Option<PathBuf>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start the terminal front end (default)
    Tui(tui::TuiArgs),

    /// Print the comments of a video
    List(list::ListArgs),

    /// Remove one comment by id
    Remove(remove::RemoveArgs),

    /// Classify the comments of a video and remove the flagged ones
    Sweep(sweep::SweepArgs),

    /// Print the activity log
    Logs(logs::LogsArgs),

    /// Manage configuration
    #[command(subcommand)]
    Config(config::ConfigCommand),

    /// Diagnose configuration, credentials and model
    Doctor(doctor::DoctorArgs),
}

/// Loaded configuration and resolved locations
pub struct AppContext {
    pub paths: AppPaths,
    pub config: Config,
    pub log_path: PathBuf,
}

/// Run the CLI application
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    // Handle color output
    if cli.no_color {
        colored::control::set_override(false);
        console::set_colors_enabled(false);
        console::set_colors_enabled_stderr(false);
    }

    let paths = AppPaths::default_location();
    let store = ConfigStore::new(cli.config.clone().unwrap_or_else(|| paths.config_file()));
    let command = cli.command.unwrap_or(Commands::Tui(tui::TuiArgs::default()));

    // These work on a broken or missing configuration
    match command {
        Commands::Config(cmd) => {
            let _guard = setup_logging(cli.verbose, None, true);
            return config::execute(cmd, &store);
        }
        Commands::Doctor(args) => {
            let _guard = setup_logging(cli.verbose, None, true);
            return doctor::execute(args, &paths, &store);
        }
        _ => {}
    }

    let config = store
        .load()
        .with_context(|| format!("Failed to load configuration from {}", store.path().display()))?;
    let log_path = paths.log_file(&config);

    // The log viewer must not create the file it reports as missing
    let activity = match command {
        Commands::Logs(_) => None,
        _ => Some(log_path.as_path()),
    };
    let stderr = !matches!(command, Commands::Tui(_));
    let _guard = setup_logging(cli.verbose, activity, stderr);

    let ctx = AppContext {
        paths,
        config,
        log_path,
    };

    // Dispatch to command handler
    let result = match command {
        Commands::Tui(args) => tui::execute(args, &ctx),
        Commands::List(args) => list::execute(args, &ctx),
        Commands::Remove(args) => remove::execute(args, &ctx),
        Commands::Sweep(args) => sweep::execute(args, &ctx),
        Commands::Logs(args) => logs::execute(args, &ctx),
        Commands::Config(_) | Commands::Doctor(_) => Ok(()),
    };

    if let Err(err) = &result {
        report(err);
    }
    result
}

/// Record a failed command in the activity log
fn report(err: &anyhow::Error) {
    let level = err
        .downcast_ref::<SweepError>()
        .map_or(Level::ERROR, |e| e.kind().log_level());
    if level == Level::INFO {
        info!(target: REPORT_TARGET, "{:#}", err);
    } else {
        error!(target: REPORT_TARGET, "{:#}", err);
    }
}

/// Install the activity log layer and, for headless commands, a stderr layer.
///
/// The returned guard flushes the activity log when dropped.
fn setup_logging(verbosity: u8, activity_log: Option<&Path>, stderr: bool) -> Option<WorkerGuard> {
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::{fmt, EnvFilter};

    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let mut filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    if let Ok(directive) = format!("{}=off", REPORT_TARGET).parse() {
        filter = filter.add_directive(directive);
    }
    let stderr_layer = stderr.then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_filter(filter)
    });

    let mut guard = None;
    let activity_layer = match activity_log.map(ts_storage::open_activity_writer) {
        Some(Ok((writer, flush_guard))) => {
            guard = Some(flush_guard);
            Some(ts_storage::activity_layer(writer))
        }
        Some(Err(e)) => {
            eprintln!("Warning: activity log disabled: {}", e);
            None
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(activity_layer)
        .with(stderr_layer)
        .init();

    guard
}

/// Load the classifier named by the configuration.
///
/// Failures only disable AI-assisted removal.
pub(crate) fn load_classifier(ctx: &AppContext) -> Option<Arc<dyn Classifier>> {
    if !ctx.config.classifier.enabled {
        info!("Classifier disabled by configuration");
        return None;
    }

    let path = ctx.paths.model_file(&ctx.config);
    match LinearTextModel::load(&path) {
        Ok(model) => {
            let info = model.info();
            info!("Model loaded.");
            info!(
                "Model {} {} ({} terms, fingerprint {})",
                info.name,
                info.version.as_deref().unwrap_or("unversioned"),
                info.terms,
                info.fingerprint.as_deref().unwrap_or("-")
            );
            Some(Arc::new(model))
        }
        Err(e) => {
            error!("Model failed to load: {}", e);
            None
        }
    }
}

/// Credentials file from the command line or the configuration
pub(crate) fn credentials_path(config: &Config, flag: Option<PathBuf>) -> Result<PathBuf> {
    flag.or_else(|| config.auth.credentials_path.clone())
        .ok_or_else(|| SweepError::validation("Upload credential file first!").into())
}

/// Run the credential flow, printing the consent URL for the operator
pub(crate) fn authenticate(config: &Config, credentials: &Path) -> Result<Arc<dyn CommentApi>> {
    use colored::Colorize;

    let authenticator = OAuthAuthenticator::from_config(config);
    let api = authenticator.authenticate(credentials, &mut |url: &str| {
        eprintln!("{}", "Open this URL to grant access:".bold());
        eprintln!();
        eprintln!("  {}", url.cyan());
        eprintln!();
    })?;

    let name = credentials
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| credentials.display().to_string());
    info!("Authentication complete with: {}", name);
    eprintln!("{} Authentication complete.", "✓".green());
    Ok(api)
}
