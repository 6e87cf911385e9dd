//! Main CLI parser.

use clap::Parser;

use crate::commands::Commands;

/// OpenAI-compatible proxy that logs what flows through it.
#[derive(Parser, Debug)]
#[command(name = "localcode")]
#[command(about = "OpenAI-compatible instrumentation proxy")]
#[command(version)]
pub struct Cli {
    /// Log level, overriding LOG_LEVEL (DEBUG, INFO, WARN, ERROR)
    #[arg(long = "log-level", global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}
