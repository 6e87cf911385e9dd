#![doc = include_str!("../README.md")]
#![deny(unsafe_code)]

pub mod bootstrap;
pub mod commands;
pub mod config;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod parser;

// Re-export primary types for convenient access
pub use bootstrap::{build_client, build_pipeline};
pub use commands::{Commands, ServeArgs};
pub use config::Config;
pub use error::ConfigError;
pub use logging::{BufferedEventLogger, TracingEventLogger, init_tracing};
pub use parser::Cli;
