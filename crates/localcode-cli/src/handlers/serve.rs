//! `localcode serve`: run the proxy until Ctrl-C.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use localcode_proxy::{AppState, is_zen_backend, serve};

use crate::bootstrap::build_pipeline;
use crate::config::Config;
use crate::logging::{BufferedEventLogger, TracingEventLogger};

/// How long to wait for queued pipeline events to be written on shutdown.
const LOG_FLUSH_TIMEOUT: Duration = Duration::from_secs(5);

pub async fn execute(config: &Config) -> anyhow::Result<()> {
    let (events, drain) = BufferedEventLogger::spawn(Arc::new(TracingEventLogger::new()));
    let pipeline = build_pipeline(config, Arc::new(events))?;

    let addr = config.bind_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    info!("LocalCode Middleware starting");
    info!(backend_url = %config.backend_url, "Backend configured");
    if config.api_key.is_empty() {
        if is_zen_backend(&config.backend_url) {
            info!("No API_KEY set; only free models will be available");
        }
    } else {
        info!("Using API key for backend requests");
    }

    let cancel = CancellationToken::new();
    let shutdown = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Shutdown requested");
            shutdown.cancel();
        }
    });

    serve(listener, AppState::new(pipeline), cancel).await?;

    if tokio::time::timeout(LOG_FLUSH_TIMEOUT, drain).await.is_err() {
        warn!("Timed out flushing pipeline events");
    }
    Ok(())
}
