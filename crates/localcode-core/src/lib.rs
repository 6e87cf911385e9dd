#![doc = include_str!("../README.md")]
#![deny(unsafe_code)]

pub mod classify;
pub mod domain;
pub mod error;
pub mod events;
pub mod extract;
pub mod pipeline;
pub mod ports;
pub mod relay;
pub mod sse;

#[cfg(test)]
mod testing;

// Re-export commonly used types for convenience
pub use classify::{DeltaCategory, classify};
pub use domain::{ChatRequest, ProtocolEvent, UsageStats};
pub use error::UpstreamError;
pub use events::{EventType, LogEvent, LogLevel, ResponseSummary};
pub use extract::{
    MessageParts, RequestInfo, extract_message_parts, extract_request_info, extract_usage_stats,
    get_finish_reason,
};
pub use pipeline::{ChatPipeline, NO_RESPONSE_MESSAGE, PipelineResponse};
pub use ports::{ChatBackend, EventLogger, EventStream, NoopLogger};
pub use relay::{RelayStream, ResponseRelay};
pub use sse::{SseDecoder, decode_stream};
