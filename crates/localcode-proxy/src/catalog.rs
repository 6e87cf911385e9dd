//! Backend model catalog: list normalization and free-model selection.

use localcode_core::UpstreamError;
use serde_json::Value;
use tracing::debug;

/// Host fragment identifying the hosted gateway.
const ZEN_HOST: &str = "opencode.ai";

/// Models the hosted gateway serves without an API key, in preference order.
pub const KNOWN_FREE_MODELS: &[&str] = &["glm-4.7-free", "big-pickle", "grok-code", "alpha-gd4"];

/// Whether `backend_url` points at the hosted gateway.
pub fn is_zen_backend(backend_url: &str) -> bool {
    backend_url.contains(ZEN_HOST)
}

/// Normalize a `/models` response body into an ordered list of model ids.
///
/// Accepts `{"data": [...]}` (hosted gateway) and a bare `[...]` (llama.cpp
/// style). Entries may be `{"id": ...}` records or plain strings. Any other
/// shape yields an empty list; emptiness is for the caller to judge.
pub fn normalize_model_ids(body: &Value) -> Vec<String> {
    let entries: &[Value] = match body {
        Value::Object(map) => match map.get("data") {
            Some(Value::Array(entries)) => entries.as_slice(),
            _ => &[],
        },
        Value::Array(entries) => entries.as_slice(),
        _ => &[],
    };

    entries
        .iter()
        .filter_map(|entry| match entry {
            Value::String(id) => Some(id.clone()),
            Value::Object(record) => record.get("id").and_then(Value::as_str).map(str::to_owned),
            other => {
                debug!("Skipping model entry without id: {other}");
                None
            }
        })
        .collect()
}

/// Pick the model to use when the caller did not name one.
///
/// On the hosted gateway the first known free model present wins; otherwise,
/// or if none is present, the first listed model.
pub fn select_free_model(models: &[String], backend_url: &str) -> Result<String, UpstreamError> {
    let first = models.first().ok_or(UpstreamError::NoModels)?;

    if is_zen_backend(backend_url)
        && let Some(free) = KNOWN_FREE_MODELS
            .iter()
            .find(|candidate| models.iter().any(|m| m == *candidate))
    {
        return Ok((*free).to_string());
    }

    Ok(first.clone())
}
