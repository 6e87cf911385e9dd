//! Inbound chat-completion request.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Model name reported when a request does not name one.
pub const UNKNOWN_MODEL: &str = "unknown";

/// Request to `/v1/chat/completions`.
///
/// Only `model`, `messages`, `stream` and `tools` are inspected by the relay.
/// Everything else the client sent is kept in `extra` and forwarded to the
/// backend untouched, so new OpenAI parameters pass through without changes
/// here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Model identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Ordered chat messages. Message content is never inspected.
    #[serde(default)]
    pub messages: Vec<Value>,
    /// Whether the client wants an SSE stream. `null` counts as `false`.
    #[serde(default, deserialize_with = "null_as_false")]
    pub stream: bool,
    /// Tool definitions for function calling.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<Value>>,
    /// Any other field, forwarded as received.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ChatRequest {
    /// Parse a raw request body.
    pub fn from_slice(body: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(body)
    }

    /// The requested model, or `"unknown"` when absent.
    pub fn model_name(&self) -> &str {
        self.model.as_deref().unwrap_or(UNKNOWN_MODEL)
    }

    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    /// Number of tool definitions; zero when `tools` is absent.
    pub fn tool_count(&self) -> usize {
        self.tools.as_ref().map_or(0, Vec::len)
    }
}

fn null_as_false<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(false))
}
