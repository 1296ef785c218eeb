//! Config command
//!
//! Manage tubesweep configuration.

use anyhow::{Context, Result};
use clap::Subcommand;
use std::fs;
use ts_core::config::Config;
use ts_storage::ConfigStore;

/// Config subcommands
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show the effective configuration
    Show {
        /// Show as JSON
        #[arg(long)]
        json: bool,
    },

    /// Write the default configuration
    Init {
        /// Overwrite without confirmation
        #[arg(long)]
        force: bool,
    },

    /// Print the configuration file location
    Path,

    /// Validate configuration
    Validate,
}

/// Execute the config command
pub fn execute(cmd: ConfigCommand, store: &ConfigStore) -> Result<()> {
    match cmd {
        ConfigCommand::Show { json } => show_config(store, json),
        ConfigCommand::Init { force } => init_config(store, force),
        ConfigCommand::Path => {
            println!("{}", store.path().display());
            Ok(())
        }
        ConfigCommand::Validate => validate_config(store),
    }
}

fn show_config(store: &ConfigStore, as_json: bool) -> Result<()> {
    use colored::Colorize;

    let config = store
        .load()
        .with_context(|| format!("Failed to load {}", store.path().display()))?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    println!("{}", "Configuration:".bold().underline());
    if store.exists() {
        println!("{}", store.path().display().to_string().dimmed());
    } else {
        println!(
            "{}",
            format!("{} (not found, showing defaults)", store.path().display()).dimmed()
        );
    }
    println!();
    println!("{}", toml::to_string_pretty(&config)?);
    Ok(())
}

fn init_config(store: &ConfigStore, force: bool) -> Result<()> {
    use colored::Colorize;

    if store.exists() {
        if !force {
            use dialoguer::Confirm;

            let confirmed = Confirm::new()
                .with_prompt("Overwrite the existing configuration with defaults?")
                .default(false)
                .interact()?;

            if !confirmed {
                println!("Init cancelled.");
                return Ok(());
            }
        }

        // Backup existing
        let backup_path = format!(
            "{}.backup-{}",
            store.path().display(),
            chrono::Local::now().format("%Y%m%d-%H%M%S")
        );
        fs::copy(store.path(), &backup_path)?;
        println!("{} Backed up to {}", "✓".green(), backup_path);
    }

    store.save(&Config::default())?;
    println!(
        "{} Default configuration written to {}",
        "✓".green(),
        store.path().display()
    );
    Ok(())
}

fn validate_config(store: &ConfigStore) -> Result<()> {
    use colored::Colorize;

    if !store.exists() {
        println!(
            "{} No configuration at {}, defaults apply",
            "⚠".yellow(),
            store.path().display()
        );
        return Ok(());
    }

    store
        .load()
        .with_context(|| format!("Invalid configuration at {}", store.path().display()))?;
    println!("{} Configuration is valid", "✓".green());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_init_writes_loadable_defaults() {
        let temp = TempDir::new().unwrap();
        let store = ConfigStore::new(temp.path().join("nested/config.toml"));

        init_config(&store, true).unwrap();
        assert!(store.exists());
        let config = store.load().unwrap();
        assert_eq!(config.api.page_size, 100);
    }

    #[test]
    fn test_forced_init_backs_up() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(&path, "[api]\npage_size = 20\n").unwrap();
        let store = ConfigStore::new(&path);

        init_config(&store, true).unwrap();

        let backups = fs::read_dir(temp.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().contains(".backup-"))
            .count();
        assert_eq!(backups, 1);
        assert_eq!(store.load().unwrap().api.page_size, 100);
    }

    #[test]
    fn test_validate_rejects_bad_page_size() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(&path, "[api]\npage_size = 500\n").unwrap();

        assert!(validate_config(&ConfigStore::new(&path)).is_err());
    }
}
