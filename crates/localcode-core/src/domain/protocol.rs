//! Events decoded from an upstream response.

use serde_json::Value;

/// One decoded unit of an upstream response.
///
/// Produced by the SSE decoder (streaming) or the upstream client
/// (non-streaming) and consumed immediately by the relay.
#[derive(Debug, Clone, PartialEq)]
pub enum ProtocolEvent {
    /// A parsed `data:` line from an SSE stream.
    Chunk(Value),
    /// The full JSON body of a non-streaming response.
    Complete(Value),
    /// The `[DONE]` sentinel.
    Done,
    /// A `data:` line whose payload was not valid JSON.
    Error(String),
}

impl ProtocolEvent {
    /// Build the error event for an unparsable payload.
    pub fn parse_error(payload: &str) -> Self {
        Self::Error(format!("Failed to parse JSON: {payload}"))
    }

    /// Short name of the variant, for logs.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Chunk(_) => "chunk",
            Self::Complete(_) => "complete",
            Self::Done => "done",
            Self::Error(_) => "error",
        }
    }
}
