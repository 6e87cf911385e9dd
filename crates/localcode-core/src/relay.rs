//! Response relay: upstream events in, client-facing output out.
//!
//! The relay owns two outputs per request. The client output is SSE frames
//! (streaming) or the upstream JSON body (non-streaming). The side channel is
//! the [`EventLogger`]. Logging never changes or holds back forwarded bytes.
//!
//! Every outbound stream ends with `data: [DONE]\n\n`. An upstream failure
//! mid-stream becomes an error frame followed by `[DONE]`, so clients with a
//! standard SSE parser never wait on a half-closed stream.

use std::sync::Arc;

use bytes::Bytes;
use futures_util::StreamExt;
use futures_util::stream::BoxStream;
use serde_json::Value;
use tracing::{debug, warn};

use crate::classify::{DeltaCategory, classify};
use crate::domain::ProtocolEvent;
use crate::error::UpstreamError;
use crate::events::{LogEvent, LogLevel, ResponseSummary};
use crate::extract::{
    extract_message_parts, extract_usage_stats, first_delta, first_message, get_finish_reason,
    has_usage, tool_call_function_name,
};
use crate::ports::{EventLogger, EventStream};
use crate::sse::frame::{data_frame, done_frame, error_frame};

/// Outbound SSE byte stream.
pub type RelayStream = BoxStream<'static, Bytes>;

/// What one upstream item turns into on the client side.
struct Step {
    frames: Vec<Bytes>,
    terminal: bool,
}

impl Step {
    const fn forward(frames: Vec<Bytes>) -> Self {
        Self {
            frames,
            terminal: false,
        }
    }

    const fn finish(frames: Vec<Bytes>) -> Self {
        Self {
            frames,
            terminal: true,
        }
    }
}

/// Re-emits upstream events to the client while logging their content.
#[derive(Clone)]
pub struct ResponseRelay {
    logger: Arc<dyn EventLogger>,
}

impl ResponseRelay {
    pub fn new(logger: Arc<dyn EventLogger>) -> Self {
        Self { logger }
    }

    /// Relay a streaming response as SSE frames.
    ///
    /// The upstream stream is dropped, releasing its connection, as soon as
    /// a terminal event has been handled.
    pub fn relay_stream(&self, mut events: EventStream) -> RelayStream {
        let logger = Arc::clone(&self.logger);

        Box::pin(async_stream::stream! {
            let mut terminated = false;

            while let Some(item) = events.next().await {
                let step = stream_step(logger.as_ref(), item);
                for frame in step.frames {
                    yield frame;
                }
                if step.terminal {
                    terminated = true;
                    break;
                }
            }
            drop(events);

            if !terminated {
                debug!("Upstream stream ended without [DONE]");
                log_event(logger.as_ref(), LogEvent::ResponseEnd(ResponseSummary::end_of_stream()));
                yield done_frame();
            }
        })
    }

    /// Relay a non-streaming response.
    ///
    /// Returns the first `Complete` payload unchanged, or `None` if the
    /// events ran out without one.
    pub async fn relay_complete(
        &self,
        mut events: EventStream,
    ) -> Result<Option<Value>, UpstreamError> {
        while let Some(item) = events.next().await {
            match item {
                Ok(ProtocolEvent::Complete(payload)) => {
                    log_event(
                        self.logger.as_ref(),
                        LogEvent::ResponseEnd(summarize_completion(&payload)),
                    );
                    return Ok(Some(payload));
                }
                Ok(other) => {
                    debug!("Ignoring {} event in non-streaming response", other.kind());
                }
                Err(e) => {
                    warn!("Upstream failed before a complete response: {e}");
                    log_event(self.logger.as_ref(), LogEvent::error(e.to_string()));
                    return Err(e);
                }
            }
        }

        Ok(None)
    }
}

fn stream_step(logger: &dyn EventLogger, item: Result<ProtocolEvent, UpstreamError>) -> Step {
    match item {
        Ok(ProtocolEvent::Chunk(payload)) => {
            log_chunk(logger, &payload);
            Step::forward(vec![data_frame(&payload)])
        }
        Ok(ProtocolEvent::Done) => {
            log_event(logger, LogEvent::ResponseEnd(ResponseSummary::end_of_stream()));
            Step::finish(vec![done_frame()])
        }
        Ok(ProtocolEvent::Error(message)) => {
            warn!("{message}");
            fail(logger, message)
        }
        Ok(ProtocolEvent::Complete(_)) => {
            debug!("Ignoring complete event in streaming response");
            Step::forward(Vec::new())
        }
        Err(e) => {
            warn!("Upstream stream failed: {e}");
            fail(logger, e.to_string())
        }
    }
}

fn fail(logger: &dyn EventLogger, message: String) -> Step {
    let frame = error_frame(&message);
    log_event(logger, LogEvent::Error { message });
    Step::finish(vec![frame, done_frame()])
}

/// Log the content carried by one streaming chunk.
fn log_chunk(logger: &dyn EventLogger, payload: &Value) {
    if let Some(delta) = first_delta(payload) {
        let category = classify(delta);
        match category {
            DeltaCategory::Content | DeltaCategory::Reasoning => {
                let text = category
                    .field()
                    .and_then(|key| delta.get(key))
                    .and_then(Value::as_str)
                    .unwrap_or_default();
                if !text.is_empty() {
                    log_event(
                        logger,
                        LogEvent::StreamChunk {
                            category,
                            content: text.to_string(),
                        },
                    );
                }
            }
            DeltaCategory::ToolCall => {
                let tool_calls = delta.get("tool_calls").and_then(Value::as_array);
                for tool_call in tool_calls.into_iter().flatten() {
                    log_event(
                        logger,
                        LogEvent::ToolCall {
                            function_name: tool_call_function_name(tool_call).to_string(),
                        },
                    );
                }
            }
            DeltaCategory::None => {}
        }
    }

    // Final chunk when the client asked for `stream_options.include_usage`.
    if has_usage(payload) {
        log_event(logger, LogEvent::Usage(extract_usage_stats(payload)));
    }
}

fn summarize_completion(payload: &Value) -> ResponseSummary {
    let parts = first_message(payload)
        .map(extract_message_parts)
        .unwrap_or_default();

    ResponseSummary {
        content: parts.content,
        reasoning: parts.reasoning_content,
        tool_calls: parts.tool_calls,
        finish_reason: Some(get_finish_reason(payload)),
        usage: Some(extract_usage_stats(payload)),
        streamed: false,
    }
}

fn log_event(logger: &dyn EventLogger, event: LogEvent) {
    let level: LogLevel = event.default_level();
    logger.log(event, level);
}
