//! Token usage reported by the backend.

use serde::{Deserialize, Serialize};

/// Token counters from a response's `usage` object.
///
/// `cached_tokens` is `None` when the backend did not report
/// `prompt_tokens_details.cached_tokens`; a reported zero stays `Some(0)`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageStats {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cached_tokens: Option<u64>,
}
