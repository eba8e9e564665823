//! CLI for rfetch.

mod commands;
mod output;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use rfetch_core::config;
use rfetch_core::retry::{BackoffType, ConfigError, RetryOptions};
use std::path::PathBuf;

use commands::{run_completions, run_config, run_get};

/// Top-level CLI for rfetch.
#[derive(Debug, Parser)]
#[command(name = "rfetch")]
#[command(about = "rfetch: HTTP GET with retry and backoff on transient server errors", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Fetch a URL, retrying 500-504 responses, and save the body to a file.
    Get {
        /// HTTP/HTTPS URL to fetch.
        url: String,
        /// Output file (default: last URL path segment, or download.bin).
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
        #[command(flatten)]
        retry: RetryArgs,
    },

    /// Show the config file path and the effective retry settings.
    Config {
        #[command(flatten)]
        retry: RetryArgs,
    },

    /// Print shell completions to stdout.
    Completions {
        /// Target shell.
        shell: Shell,
    },
}

/// Retry flags; each one overrides the `[retry]` section of config.toml.
#[derive(Debug, Clone, Default, Args)]
pub struct RetryArgs {
    /// Retries after the first attempt (default 0).
    #[arg(long, value_name = "N")]
    pub retries: Option<u32>,
    /// Backoff base in seconds (default 1).
    #[arg(long, value_name = "SECS")]
    pub backoff: Option<f64>,
    /// "fixed" (default) or "exponential".
    #[arg(long, value_name = "TYPE", value_parser = parse_backoff_type)]
    pub backoff_type: Option<BackoffType>,
    /// Upper bound on a single backoff delay, in seconds.
    #[arg(long, value_name = "SECS")]
    pub max_delay: Option<f64>,
}

impl RetryArgs {
    pub fn to_options(&self) -> RetryOptions {
        RetryOptions {
            retries: self.retries,
            backoff: self.backoff,
            backoff_type: self.backoff_type,
            max_delay: self.max_delay,
        }
    }
}

fn parse_backoff_type(s: &str) -> Result<BackoffType, ConfigError> {
    s.parse()
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();

        match cli.command {
            CliCommand::Get { url, output, retry } => {
                let cfg = config::load_or_default()?;
                tracing::debug!("loaded config: {:?}", cfg);
                run_get(&cfg, &url, output.as_deref(), retry.to_options()).await?;
            }
            CliCommand::Config { retry } => {
                let cfg = config::load_or_default()?;
                run_config(&cfg, retry.to_options())?;
            }
            CliCommand::Completions { shell } => run_completions(shell),
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
