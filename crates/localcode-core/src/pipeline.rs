//! Request handling, independent of the web framework.
//!
//! [`ChatPipeline`] is what the HTTP layer holds: it logs `request_start`,
//! calls the backend and hands the result to the [`ResponseRelay`]. The
//! transport only maps a [`PipelineResponse`] onto its own response type.

use std::sync::Arc;

use futures_util::stream;
use serde_json::Value;
use tracing::{debug, warn};

use crate::domain::ChatRequest;
use crate::error::UpstreamError;
use crate::events::{LogEvent, LogLevel};
use crate::extract::extract_request_info;
use crate::ports::{ChatBackend, EventLogger, EventStream};
use crate::relay::{RelayStream, ResponseRelay};

/// Message of the body returned when a non-streaming call yields nothing.
pub const NO_RESPONSE_MESSAGE: &str = "No response from upstream";

/// Result of handling one chat request.
pub enum PipelineResponse {
    /// SSE frames for a streaming request, always ending with `[DONE]`.
    Stream(RelayStream),
    /// Upstream JSON body for a non-streaming request, unchanged.
    Complete(Value),
    /// The upstream call finished without a `Complete` event.
    NoResponse,
    /// The non-streaming upstream call failed.
    Failed(UpstreamError),
}

impl std::fmt::Debug for PipelineResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stream(_) => f.write_str("Stream(..)"),
            Self::Complete(body) => f.debug_tuple("Complete").field(body).finish(),
            Self::NoResponse => f.write_str("NoResponse"),
            Self::Failed(e) => f.debug_tuple("Failed").field(e).finish(),
        }
    }
}

/// Backend, logger and relay for one configured upstream.
///
/// Holds no per-request state, so one instance serves every connection.
#[derive(Clone)]
pub struct ChatPipeline {
    backend: Arc<dyn ChatBackend>,
    logger: Arc<dyn EventLogger>,
    relay: ResponseRelay,
}

impl ChatPipeline {
    pub fn new(backend: Arc<dyn ChatBackend>, logger: Arc<dyn EventLogger>) -> Self {
        let relay = ResponseRelay::new(Arc::clone(&logger));
        Self {
            backend,
            logger,
            relay,
        }
    }

    pub fn backend(&self) -> &Arc<dyn ChatBackend> {
        &self.backend
    }

    pub fn logger(&self) -> &Arc<dyn EventLogger> {
        &self.logger
    }

    /// Handle one chat request.
    ///
    /// `request_start` is logged before the upstream call begins.
    pub async fn handle(&self, request: ChatRequest) -> PipelineResponse {
        let info = extract_request_info(&request);
        debug!(
            model = %info.model,
            stream = info.stream,
            messages = info.messages_count,
            tools = info.tools_count,
            "Dispatching chat completion"
        );
        self.logger.log(LogEvent::RequestStart(info), LogLevel::Info);

        if request.stream {
            self.handle_stream(&request).await
        } else {
            self.handle_complete(&request).await
        }
    }

    async fn handle_stream(&self, request: &ChatRequest) -> PipelineResponse {
        let events = match self.backend.send(request).await {
            Ok(events) => events,
            Err(e) => {
                warn!("Upstream rejected streaming request: {e}");
                failed_before_first_event(e)
            }
        };

        PipelineResponse::Stream(self.relay.relay_stream(events))
    }

    async fn handle_complete(&self, request: &ChatRequest) -> PipelineResponse {
        let events = match self.backend.send(request).await {
            Ok(events) => events,
            Err(e) => {
                warn!("Upstream request failed: {e}");
                self.logger
                    .log(LogEvent::error(e.to_string()), LogLevel::Error);
                return PipelineResponse::Failed(e);
            }
        };

        match self.relay.relay_complete(events).await {
            Ok(Some(body)) => PipelineResponse::Complete(body),
            Ok(None) => {
                warn!("{NO_RESPONSE_MESSAGE}");
                self.logger
                    .log(LogEvent::error(NO_RESPONSE_MESSAGE), LogLevel::Warn);
                PipelineResponse::NoResponse
            }
            Err(e) => PipelineResponse::Failed(e),
        }
    }
}

/// A stream whose only item is the error that prevented it from starting.
///
/// Lets the relay turn an early failure into the same error frame and
/// `[DONE]` as a mid-stream failure.
fn failed_before_first_event(err: UpstreamError) -> EventStream {
    Box::pin(stream::once(async move { Err(err) }))
}
