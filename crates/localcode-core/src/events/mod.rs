//! Structured log events emitted by the relay and request handler.
//!
//! Events are transport-agnostic. The [`EventLogger`](crate::EventLogger)
//! port decides how they are rendered.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use serde_json::Value;

use crate::classify::DeltaCategory;
use crate::domain::UsageStats;
use crate::extract::RequestInfo;

/// Kind of a [`LogEvent`], using the names consumers match on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    RequestStart,
    ResponseEnd,
    StreamChunk,
    ToolCall,
    Reasoning,
    Error,
    Usage,
}

impl EventType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RequestStart => "request_start",
            Self::ResponseEnd => "response_end",
            Self::StreamChunk => "stream_chunk",
            Self::ToolCall => "tool_call",
            Self::Reasoning => "reasoning",
            Self::Error => "error",
            Self::Usage => "usage",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Severity attached to a logged event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a log level name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown log level '{0}' (expected DEBUG, INFO, WARN or ERROR)")]
pub struct ParseLogLevelError(pub String);

impl FromStr for LogLevel {
    type Err = ParseLogLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "DEBUG" => Ok(Self::Debug),
            "INFO" => Ok(Self::Info),
            "WARN" | "WARNING" => Ok(Self::Warn),
            "ERROR" => Ok(Self::Error),
            _ => Err(ParseLogLevelError(s.to_string())),
        }
    }
}

/// Payload of a `response_end` event.
///
/// Non-streaming responses fill in every field. The end-of-stream marker
/// only sets `streamed`, since stream content was already logged chunk by
/// chunk.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResponseSummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<UsageStats>,
    pub streamed: bool,
}

impl ResponseSummary {
    /// Marker logged when an SSE stream reaches `[DONE]`.
    pub fn end_of_stream() -> Self {
        Self {
            streamed: true,
            ..Self::default()
        }
    }
}

/// A structured observability event.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum LogEvent {
    RequestStart(RequestInfo),
    ResponseEnd(ResponseSummary),
    StreamChunk {
        category: DeltaCategory,
        content: String,
    },
    ToolCall {
        function_name: String,
    },
    /// Reserved for loggers and other producers. The relay reports
    /// reasoning deltas as `StreamChunk` with [`DeltaCategory::Reasoning`]
    /// and non-streaming reasoning inside `ResponseEnd`.
    Reasoning {
        content: String,
    },
    Error {
        message: String,
    },
    Usage(UsageStats),
}

impl LogEvent {
    pub const fn event_type(&self) -> EventType {
        match self {
            Self::RequestStart(_) => EventType::RequestStart,
            Self::ResponseEnd(_) => EventType::ResponseEnd,
            Self::StreamChunk { .. } => EventType::StreamChunk,
            Self::ToolCall { .. } => EventType::ToolCall,
            Self::Reasoning { .. } => EventType::Reasoning,
            Self::Error { .. } => EventType::Error,
            Self::Usage(_) => EventType::Usage,
        }
    }

    /// Level the pipeline logs this event at.
    pub const fn default_level(&self) -> LogLevel {
        match self {
            Self::StreamChunk { .. } | Self::Reasoning { .. } => LogLevel::Debug,
            Self::Error { .. } => LogLevel::Error,
            _ => LogLevel::Info,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }
}
