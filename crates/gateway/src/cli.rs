//! Command-line interface and config loading.

use clap::{Parser, Subcommand};
use sg_domain::config::Config;

/// SheGlow Concierge — skincare routine reminders and calendars.
#[derive(Debug, Parser)]
#[command(name = "sheglow", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Start the server (default when no subcommand is given).
    Serve,
    /// Configuration utilities.
    #[command(subcommand)]
    Config(ConfigCommand),
    /// Print version information.
    Version,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Parse the config file and report any errors.
    Validate,
    /// Dump the resolved configuration (with defaults) as TOML.
    Show,
}

/// Load config from the path in `SG_CONFIG` (default `sheglow.toml`).
/// A missing file is not an error; defaults apply.
pub fn load_config() -> anyhow::Result<(Config, String)> {
    let config_path = std::env::var("SG_CONFIG").unwrap_or_else(|_| "sheglow.toml".into());

    let config = if std::path::Path::new(&config_path).exists() {
        let raw = std::fs::read_to_string(&config_path)
            .map_err(|e| anyhow::anyhow!("reading {config_path}: {e}"))?;
        toml::from_str(&raw).map_err(|e| anyhow::anyhow!("parsing {config_path}: {e}"))?
    } else {
        Config::default()
    };

    Ok((config, config_path))
}

/// Parse and validate the config, printing any issues.
pub fn validate(config: &Config, config_path: &str) -> bool {
    match config.scheduler.validate() {
        Ok(()) => {
            println!("Config OK ({config_path})");
            true
        }
        Err(issue) => {
            println!("{issue}");
            println!("\n1 error(s) in {config_path}");
            false
        }
    }
}

/// Dump the resolved config (with all defaults filled in) as TOML.
pub fn show(config: &Config) {
    match toml::to_string_pretty(config) {
        Ok(output) => print!("{output}"),
        Err(e) => {
            eprintln!("Failed to serialize config: {e}");
            std::process::exit(1);
        }
    }
}
