//! Shopfront CLI - command line client for the Shopfront REST API

mod commands;
mod config;
mod logging;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use crate::commands::Commands;
use crate::config::CliConfig;
use shopfront_core::{FileStore, StateDir};
use shopfront_http::SessionClient;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{Level, debug, error, warn};

#[derive(Parser)]
#[command(name = "shopfront")]
#[command(about = "Command line client for the Shopfront REST API")]
#[command(version)]
struct Cli {
    /// Set logging level
    #[arg(short = 'l', long, global = true, default_value = "warn")]
    log_level: LogLevel,

    /// Configuration file (TOML or YAML), defaults to config.toml in the state directory
    #[arg(short = 'c', long, global = true)]
    config: Option<PathBuf>,

    /// Data directory for the session store and logs
    #[arg(short = 'd', long, global = true)]
    data_dir: Option<PathBuf>,

    /// API base URL, overrides the configuration
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Timeout for the whole command in seconds (0 = no timeout)
    #[arg(short = 't', long, global = true, default_value = "60")]
    timeout: u64,

    /// Disable file logging (only log to stderr)
    #[arg(long, global = true)]
    no_file_log: bool,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_dirs = cli
        .data_dir
        .clone()
        .map_or_else(StateDir::new, StateDir::with_override);
    let config_path = CliConfig::resolve_path(cli.config, &default_dirs);
    let mut config = CliConfig::load(config_path.as_deref())?;
    if let Some(base_url) = cli.base_url {
        config.client.base_url = base_url;
    }

    let state_dir = cli
        .data_dir
        .or_else(|| config.state_dir.clone())
        .map_or_else(StateDir::new, StateDir::with_override);

    logging::init_logging(
        cli.log_level.into(),
        &state_dir.log_path("cli"),
        cli.no_file_log,
    )?;

    debug!(base_url = %config.client.base_url, "Starting Shopfront CLI");

    let client = SessionClient::builder()
        .config(config.client)
        .store(FileStore::new(state_dir.session_path()))
        .on_session_expired(|| warn!("Session expired, run `shopfront login` again"))
        .build()
        .context("Failed to build HTTP client")?;

    let result = if cli.timeout == 0 {
        cli.command.execute(&client).await
    } else {
        let timeout_duration = Duration::from_secs(cli.timeout);
        match tokio::time::timeout(timeout_duration, cli.command.execute(&client)).await {
            Ok(result) => result,
            Err(_) => {
                error!("Command timed out after {} seconds", cli.timeout);
                std::process::exit(1);
            }
        }
    };

    if let Err(e) = result {
        error!("Command failed: {e:#}");
        std::process::exit(1);
    }

    Ok(())
}

#[derive(Clone, Debug, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for Level {
    fn from(log_level: LogLevel) -> Self {
        match log_level {
            LogLevel::Error => Self::ERROR,
            LogLevel::Warn => Self::WARN,
            LogLevel::Info => Self::INFO,
            LogLevel::Debug => Self::DEBUG,
            LogLevel::Trace => Self::TRACE,
        }
    }
}
