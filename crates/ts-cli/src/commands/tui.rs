//! Tui command
//!
//! Start the terminal front end.

use super::{load_classifier, AppContext};
use anyhow::Result;
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;
use ts_client::{LatencyProbe, OAuthAuthenticator};
use ts_core::session::Session;
use ts_ui::{App, AppState, Services};

/// Arguments for the tui command
#[derive(Debug, Default, Args)]
pub struct TuiArgs {
    /// Pre-fill the credentials file input
    #[arg(long)]
    pub credentials: Option<PathBuf>,

    /// Don't probe connectivity for the footer
    #[arg(long)]
    pub no_ping: bool,
}

/// Execute the tui command
pub fn execute(args: TuiArgs, ctx: &AppContext) -> Result<()> {
    let config = &ctx.config;
    let session = Session::new(load_classifier(ctx));

    let mut state = AppState::new(session).with_page_size(config.api.page_size);
    if let Some(path) = args.credentials.or_else(|| config.auth.credentials_path.clone()) {
        state = state.with_credentials(&path);
    }

    let ping_interval = Duration::from_secs(config.ui.ping_interval_secs.max(1));
    let probe = if args.no_ping {
        None
    } else {
        // A probe never outlives its interval
        let timeout = ping_interval.min(Duration::from_secs(config.api.timeout_secs));
        match LatencyProbe::new(config.ui.ping_host.clone(), timeout) {
            Ok(probe) => Some(probe),
            Err(e) => {
                warn!("Connectivity probe disabled: {}", e);
                None
            }
        }
    };

    let services = Services {
        authenticator: Arc::new(OAuthAuthenticator::from_config(config)),
        probe,
        log_path: ctx.log_path.clone(),
        tick_rate: Duration::from_millis(config.ui.tick_rate_ms.max(10)),
        ping_interval,
    };

    let mut app = App::new(state, services)?;
    app.run()
}
