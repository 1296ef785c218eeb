//! Doctor command
//!
//! Diagnose configuration, credentials, model and log location.

use anyhow::Result;
use clap::Args;
use std::fs::OpenOptions;
use std::path::Path;
use std::time::Duration;
use ts_client::{ClientSecret, LatencyProbe};
use ts_core::classifier::LinearTextModel;
use ts_core::config::Config;
use ts_storage::{AppPaths, ConfigStore};

/// Arguments for the doctor command
#[derive(Debug, Args)]
pub struct DoctorArgs {
    /// Also check that the API host is reachable
    #[arg(long)]
    pub network: bool,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

/// Check result
struct CheckResult {
    name: String,
    passed: bool,
    message: String,
    suggestion: Option<String>,
}

impl CheckResult {
    fn ok(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            passed: true,
            message: message.to_string(),
            suggestion: None,
        }
    }

    fn fail(name: &str, message: &str, suggestion: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            passed: false,
            message: message.to_string(),
            suggestion: suggestion.map(|s| s.to_string()),
        }
    }

    fn warn(name: &str, message: &str, suggestion: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            passed: true,
            message: format!("⚠ {}", message),
            suggestion: suggestion.map(|s| s.to_string()),
        }
    }

    fn is_warning(&self) -> bool {
        self.passed && self.message.starts_with('⚠')
    }
}

/// Execute the doctor command
pub fn execute(args: DoctorArgs, paths: &AppPaths, store: &ConfigStore) -> Result<()> {
    use colored::Colorize;

    let mut results = Vec::new();

    println!("\n{}", "1. Configuration".bold().underline());
    let (config, config_results) = check_configuration(store);
    results.extend(config_results);

    println!("\n{}", "2. Credentials".bold().underline());
    results.push(check_credentials(&config));

    println!("\n{}", "3. Classifier".bold().underline());
    results.push(check_model(&config, &paths.model_file(&config)));

    println!("\n{}", "4. Activity log".bold().underline());
    results.push(check_log(&paths.log_file(&config)));

    if args.network {
        println!("\n{}", "5. Network".bold().underline());
        results.push(check_network(&config));
    }

    // Print results
    for result in &results {
        let status = if !result.passed {
            "✗".red()
        } else if result.is_warning() {
            "⚠".yellow()
        } else {
            "✓".green()
        };

        println!("   {} {}: {}", status, result.name, result.message);

        if args.verbose {
            if let Some(suggestion) = &result.suggestion {
                println!("     {}", suggestion.dimmed());
            }
        }
    }

    let warnings: Vec<_> = results.iter().filter(|r| r.is_warning()).collect();
    let errors: Vec<_> = results.iter().filter(|r| !r.passed).collect();

    // Summary
    println!(
        "\n{}: {} warnings, {} errors",
        "Summary".bold(),
        warnings.len().to_string().yellow(),
        errors.len().to_string().red()
    );

    if !errors.is_empty() {
        println!("\n{}", "✗ Errors:".red());
        for result in &errors {
            println!("  - {}: {}", result.name, result.message);
            if let Some(suggestion) = &result.suggestion {
                println!("    Fix: {}", suggestion);
            }
        }
    }

    if errors.is_empty() && warnings.is_empty() {
        println!("\n{} All checks passed!", "✓".green());
    }

    Ok(())
}

fn check_configuration(store: &ConfigStore) -> (Config, Vec<CheckResult>) {
    let mut results = vec![CheckResult::ok("tubesweep version", env!("CARGO_PKG_VERSION"))];

    if !store.exists() {
        results.push(CheckResult::warn(
            "config.toml",
            &format!("not found at {}, using defaults", store.path().display()),
            Some("Run 'tubesweep config init' to create"),
        ));
        return (Config::default(), results);
    }

    match store.load() {
        Ok(config) => {
            results.push(CheckResult::ok("config.toml", "valid"));
            (config, results)
        }
        Err(e) => {
            results.push(CheckResult::fail(
                "config.toml",
                &e.to_string(),
                Some("Fix the file or run 'tubesweep config init --force'"),
            ));
            (Config::default(), results)
        }
    }
}

fn check_credentials(config: &Config) -> CheckResult {
    let Some(path) = &config.auth.credentials_path else {
        return CheckResult::warn(
            "Credentials",
            "no default credentials file configured",
            Some("Set [auth] credentials_path or pass --credentials"),
        );
    };

    match ClientSecret::load(path) {
        Ok(secret) => CheckResult::ok(
            "Credentials",
            &format!("{} (client {})", path.display(), secret.client_id),
        ),
        Err(e) => CheckResult::fail(
            "Credentials",
            &e.to_string(),
            Some("Download an OAuth desktop client JSON from the Google Cloud console"),
        ),
    }
}

fn check_model(config: &Config, path: &Path) -> CheckResult {
    if !config.classifier.enabled {
        return CheckResult::warn(
            "Model",
            "disabled, AI assisted removal unavailable",
            Some("Set [classifier] enabled = true"),
        );
    }

    match LinearTextModel::load(path) {
        Ok(model) => {
            let info = model.info();
            CheckResult::ok(
                "Model",
                &format!(
                    "{} {} ({} terms, fingerprint {})",
                    info.name,
                    info.version.as_deref().unwrap_or("unversioned"),
                    info.terms,
                    info.fingerprint.as_deref().unwrap_or("-")
                ),
            )
        }
        Err(e) => CheckResult::fail(
            "Model",
            &e.to_string(),
            Some("AI assisted removal stays off until a model loads"),
        ),
    }
}

fn check_log(path: &Path) -> CheckResult {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                return CheckResult::fail(
                    "Activity log",
                    &format!("cannot create {}: {}", parent.display(), e),
                    None,
                );
            }
        }
    }

    match OpenOptions::new().create(true).append(true).open(path) {
        Ok(_) => CheckResult::ok("Activity log", &format!("{} (writable)", path.display())),
        Err(e) => CheckResult::fail(
            "Activity log",
            &format!("cannot write {}: {}", path.display(), e),
            Some("Set [log] path to a writable location"),
        ),
    }
}

fn check_network(config: &Config) -> CheckResult {
    let probe = match LatencyProbe::new(
        config.ui.ping_host.clone(),
        Duration::from_secs(config.api.timeout_secs),
    ) {
        Ok(probe) => probe,
        Err(e) => return CheckResult::fail("Network", &e.to_string(), None),
    };

    match probe.measure() {
        Some(rtt) => CheckResult::ok(
            "Network",
            &format!("{} reachable in {} ms", probe.url(), rtt.as_millis()),
        ),
        None => CheckResult::fail(
            "Network",
            &format!("{} unreachable", probe.url()),
            Some("Check your connection or [ui] ping_host"),
        ),
    }
}
