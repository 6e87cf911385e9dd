//! CLI entry point - the composition root.

use clap::Parser;
use tracing::warn;

use localcode_cli::{Cli, Commands, Config, handlers, init_tracing};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let (mut config, mut problems) = Config::from_env();
    if let Some(raw) = cli.log_level.as_deref() {
        match raw.parse() {
            Ok(level) => config.log_level = level,
            Err(e) => problems.push(localcode_cli::ConfigError::InvalidValue {
                key: "--log-level",
                value: raw.to_string(),
                reason: format!("{e}"),
            }),
        }
    }

    init_tracing(config.log_level);
    for problem in &problems {
        warn!("{problem}; ignoring it");
    }

    match cli.command.unwrap_or_default() {
        Commands::Serve(args) => {
            config.apply_serve_args(&args);
            handlers::serve::execute(&config).await
        }
        Commands::Models { backend_url } => {
            config.apply_backend_override(backend_url.as_deref());
            handlers::models::execute(&config).await
        }
    }
}
