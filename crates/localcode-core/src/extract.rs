//! Field extraction from requests and backend payloads.
//!
//! Payloads are kept as `serde_json::Value` so they can be forwarded
//! unchanged; these accessors read the handful of fields the relay logs
//! and treat every missing or mistyped field as absent.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::domain::{ChatRequest, UsageStats};

/// Finish reason reported when the backend sent none.
pub const UNKNOWN_FINISH_REASON: &str = "unknown";

/// Function name reported for a tool call without one.
pub const UNKNOWN_FUNCTION: &str = "unknown";

/// Summary of an inbound request, logged as `request_start`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequestInfo {
    pub model: String,
    pub stream: bool,
    pub messages_count: usize,
    pub has_tools: bool,
    pub tools_count: usize,
}

/// Content, reasoning and tool calls of one message or delta.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MessageParts {
    pub content: Option<String>,
    pub reasoning_content: Option<String>,
    pub tool_calls: Option<Vec<Value>>,
}

pub fn extract_request_info(request: &ChatRequest) -> RequestInfo {
    let tools_count = request.tool_count();
    RequestInfo {
        model: request.model_name().to_string(),
        stream: request.stream,
        messages_count: request.message_count(),
        has_tools: tools_count > 0,
        tools_count,
    }
}

/// Split a message (non-streaming) or delta (streaming) into its parts.
///
/// Uses field presence only; classification is a streaming concern.
pub fn extract_message_parts(message: &Map<String, Value>) -> MessageParts {
    MessageParts {
        content: string_field(message, "content"),
        reasoning_content: string_field(message, "reasoning_content"),
        tool_calls: message
            .get("tool_calls")
            .and_then(Value::as_array)
            .cloned(),
    }
}

#[derive(Deserialize)]
struct RawUsage {
    prompt_tokens: Option<u64>,
    completion_tokens: Option<u64>,
    total_tokens: Option<u64>,
    prompt_tokens_details: Option<RawPromptTokensDetails>,
}

#[derive(Deserialize)]
struct RawPromptTokensDetails {
    cached_tokens: Option<u64>,
}

/// Read `payload.usage`. Missing counters are zero; `cached_tokens` stays
/// `None` unless `usage.prompt_tokens_details.cached_tokens` is present.
pub fn extract_usage_stats(payload: &Value) -> UsageStats {
    let Some(usage) = payload.get("usage").filter(|u| !u.is_null()) else {
        return UsageStats::default();
    };

    match RawUsage::deserialize(usage) {
        Ok(raw) => UsageStats {
            prompt_tokens: raw.prompt_tokens.unwrap_or(0),
            completion_tokens: raw.completion_tokens.unwrap_or(0),
            total_tokens: raw.total_tokens.unwrap_or(0),
            cached_tokens: raw.prompt_tokens_details.and_then(|d| d.cached_tokens),
        },
        Err(e) => {
            debug!("Ignoring malformed usage object: {e}");
            UsageStats::default()
        }
    }
}

/// True when the payload carries a non-null `usage` object.
pub fn has_usage(payload: &Value) -> bool {
    payload.get("usage").is_some_and(Value::is_object)
}

/// `choices[0].finish_reason`, or `"unknown"`.
pub fn get_finish_reason(payload: &Value) -> String {
    first_choice(payload)
        .and_then(|choice| choice.get("finish_reason"))
        .and_then(Value::as_str)
        .unwrap_or(UNKNOWN_FINISH_REASON)
        .to_string()
}

/// `choices[0]` as an object.
pub fn first_choice(payload: &Value) -> Option<&Map<String, Value>> {
    payload
        .get("choices")
        .and_then(Value::as_array)
        .and_then(|choices| choices.first())
        .and_then(Value::as_object)
}

/// `choices[0].delta` of a streaming chunk.
pub fn first_delta(payload: &Value) -> Option<&Map<String, Value>> {
    first_choice(payload)
        .and_then(|choice| choice.get("delta"))
        .and_then(Value::as_object)
}

/// `choices[0].message` of a non-streaming response.
pub fn first_message(payload: &Value) -> Option<&Map<String, Value>> {
    first_choice(payload)
        .and_then(|choice| choice.get("message"))
        .and_then(Value::as_object)
}

/// `function.name` of a tool-call entry, or `"unknown"`.
pub fn tool_call_function_name(tool_call: &Value) -> &str {
    tool_call
        .get("function")
        .and_then(|f| f.get("name"))
        .and_then(Value::as_str)
        .unwrap_or(UNKNOWN_FUNCTION)
}

fn string_field(object: &Map<String, Value>, key: &str) -> Option<String> {
    object.get(key).and_then(Value::as_str).map(str::to_string)
}
