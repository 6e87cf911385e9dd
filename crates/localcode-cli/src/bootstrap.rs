//! Composition root: wires configuration into concrete adapters.

use std::sync::Arc;

use localcode_core::{ChatPipeline, EventLogger, UpstreamError};
use localcode_proxy::{ClientConfig, OpenAiClient};

use crate::config::Config;

/// Build the backend client described by `config`.
pub fn build_client(config: &Config) -> Result<OpenAiClient, UpstreamError> {
    let client_config = ClientConfig::new(config.backend_url.as_str())
        .with_api_key(config.api_key.as_str())
        .with_timeout(config.upstream_timeout);
    OpenAiClient::new(client_config)
}

/// Build the request pipeline that the server hands every chat request to.
pub fn build_pipeline(
    config: &Config,
    logger: Arc<dyn EventLogger>,
) -> Result<ChatPipeline, UpstreamError> {
    let client = build_client(config)?;
    Ok(ChatPipeline::new(Arc::new(client), logger))
}
