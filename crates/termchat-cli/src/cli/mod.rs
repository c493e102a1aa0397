//! CLI argument definitions for the `termchat` binary.
//!
//! Uses clap derive macros. Running `termchat` with no subcommand starts an
//! interactive chat; every tuning flag can also come from a `TERMCHAT_*`
//! environment variable.

pub mod chat;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

use termchat_types::config::ConfigOverrides;

/// Chat with an OpenAI-compatible model from your terminal.
#[derive(Parser)]
#[command(name = "termchat", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Model to send requests to [default: gpt-3.5-turbo].
    #[arg(long, env = "TERMCHAT_MODEL", global = true)]
    pub model: Option<String>,

    /// Retries after a failed request [default: 3].
    #[arg(long, env = "TERMCHAT_MAX_RETRIES", global = true)]
    pub max_retries: Option<u32>,

    /// Delay before the first retry in milliseconds; doubles on each retry [default: 2000].
    #[arg(long, env = "TERMCHAT_INITIAL_DELAY_MS", global = true)]
    pub initial_delay_ms: Option<u64>,

    /// Per-request HTTP timeout in seconds [default: 60].
    #[arg(long, env = "TERMCHAT_TIMEOUT_SECS", global = true)]
    pub timeout_secs: Option<u64>,

    /// Base URL of the chat completions API [default: https://api.openai.com/v1].
    #[arg(long, env = "TERMCHAT_BASE_URL", global = true)]
    pub base_url: Option<String>,

    /// TOML config file (defaults to ~/.termchat/config.toml when present).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Suppress all log output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed logs on stderr (-v for debug, -vv for trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Export tracing spans through OpenTelemetry (stdout exporter).
    #[arg(long, global = true)]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

impl Cli {
    /// Flags that take precedence over the config file.
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            model: self.model.clone(),
            base_url: self.base_url.clone(),
            timeout_secs: self.timeout_secs,
            max_retries: self.max_retries,
            initial_delay_ms: self.initial_delay_ms,
        }
    }
}
