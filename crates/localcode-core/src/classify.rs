//! Streaming delta classification.
//!
//! A delta may carry several keys at once; the category is decided by key
//! presence in fixed priority order: `tool_calls`, then `reasoning_content`,
//! then `content`. A key with a `null` value still counts as present.

use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value};

/// Content category of one streaming delta.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeltaCategory {
    ToolCall,
    Reasoning,
    Content,
    None,
}

impl DeltaCategory {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ToolCall => "tool_call",
            Self::Reasoning => "reasoning",
            Self::Content => "content",
            Self::None => "none",
        }
    }

    /// The delta key holding this category's payload.
    pub const fn field(self) -> Option<&'static str> {
        match self {
            Self::ToolCall => Some("tool_calls"),
            Self::Reasoning => Some("reasoning_content"),
            Self::Content => Some("content"),
            Self::None => None,
        }
    }
}

impl fmt::Display for DeltaCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const PRIORITY: [DeltaCategory; 3] = [
    DeltaCategory::ToolCall,
    DeltaCategory::Reasoning,
    DeltaCategory::Content,
];

/// Classify a delta object. Total over any JSON object.
pub fn classify(delta: &Map<String, Value>) -> DeltaCategory {
    PRIORITY
        .into_iter()
        .find(|category| category.field().is_some_and(|key| delta.contains_key(key)))
        .unwrap_or(DeltaCategory::None)
}
