//! Tracing setup and the console [`EventLogger`] implementations.

use std::sync::Arc;

use localcode_core::{EventLogger, LogEvent, LogLevel, ResponseSummary, UsageStats};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::field;
use tracing_subscriber::EnvFilter;

/// Target every pipeline event is logged under.
pub const EVENT_TARGET: &str = "localcode::events";

/// Preview length for response content and reasoning.
const SUMMARY_PREVIEW_CHARS: usize = 150;
/// Preview length for individual stream chunks.
const CHUNK_PREVIEW_CHARS: usize = 100;

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over the configured level.
pub fn init_tracing(level: LogLevel) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(level)));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Filter directive for a configured level; HTTP internals stay at warn.
pub fn default_directive(level: LogLevel) -> String {
    let level = match level {
        LogLevel::Debug => "debug",
        LogLevel::Info => "info",
        LogLevel::Warn => "warn",
        LogLevel::Error => "error",
    };
    format!("{level},hyper=warn,hyper_util=warn,reqwest=warn")
}

/// Shorten `text` to `max_chars` characters, marking the cut with `...`.
pub fn preview(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

macro_rules! emit {
    ($level:expr, $($arg:tt)+) => {
        match $level {
            LogLevel::Debug => tracing::debug!(target: EVENT_TARGET, $($arg)+),
            LogLevel::Info => tracing::info!(target: EVENT_TARGET, $($arg)+),
            LogLevel::Warn => tracing::warn!(target: EVENT_TARGET, $($arg)+),
            LogLevel::Error => tracing::error!(target: EVENT_TARGET, $($arg)+),
        }
    };
}

/// Renders each [`LogEvent`] as one tracing event on [`EVENT_TARGET`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingEventLogger;

impl TracingEventLogger {
    pub const fn new() -> Self {
        Self
    }
}

impl EventLogger for TracingEventLogger {
    fn log(&self, event: LogEvent, level: LogLevel) {
        let event_type = event.event_type().as_str();

        match event {
            LogEvent::RequestStart(info) => emit!(
                level,
                event_type,
                model = %info.model,
                stream = info.stream,
                messages = info.messages_count,
                has_tools = info.has_tools,
                tools = info.tools_count,
                "Request started"
            ),
            LogEvent::ResponseEnd(summary) => log_summary(level, event_type, &summary),
            LogEvent::StreamChunk { category, content } => emit!(
                level,
                event_type,
                category = %category,
                content = %preview(&content, CHUNK_PREVIEW_CHARS),
                "Stream chunk"
            ),
            LogEvent::ToolCall { function_name } => emit!(
                level,
                event_type,
                function = %function_name,
                "Tool call"
            ),
            LogEvent::Reasoning { content } => emit!(
                level,
                event_type,
                content = %preview(&content, SUMMARY_PREVIEW_CHARS),
                "Reasoning"
            ),
            LogEvent::Error { message } => emit!(level, event_type, "{message}"),
            LogEvent::Usage(usage) => log_usage(level, event_type, &usage),
        }
    }
}

fn log_summary(level: LogLevel, event_type: &str, summary: &ResponseSummary) {
    if summary.streamed {
        emit!(level, event_type, "Stream finished");
        return;
    }

    let content = summary
        .content
        .as_deref()
        .map(|c| field::display(preview(c, SUMMARY_PREVIEW_CHARS)));
    let reasoning = summary
        .reasoning
        .as_deref()
        .map(|r| field::display(preview(r, SUMMARY_PREVIEW_CHARS)));
    let tool_calls = summary.tool_calls.as_ref().map(Vec::len);

    emit!(
        level,
        event_type,
        content,
        reasoning,
        tool_calls,
        finish_reason = summary.finish_reason.as_deref(),
        prompt_tokens = summary.usage.map(|u| u.prompt_tokens),
        completion_tokens = summary.usage.map(|u| u.completion_tokens),
        total_tokens = summary.usage.map(|u| u.total_tokens),
        cached_tokens = summary.usage.and_then(|u| u.cached_tokens),
        "Response complete"
    );
}

fn log_usage(level: LogLevel, event_type: &str, usage: &UsageStats) {
    emit!(
        level,
        event_type,
        prompt_tokens = usage.prompt_tokens,
        completion_tokens = usage.completion_tokens,
        total_tokens = usage.total_tokens,
        cached_tokens = usage.cached_tokens,
        "Token usage"
    );
}

/// Fire-and-forget wrapper: events go through an unbounded channel to a
/// drain task that calls the inner logger.
///
/// The drain task ends once every clone of the logger has been dropped.
#[derive(Debug, Clone)]
pub struct BufferedEventLogger {
    tx: mpsc::UnboundedSender<(LogEvent, LogLevel)>,
}

impl BufferedEventLogger {
    /// Spawn the drain task on the current runtime.
    pub fn spawn(inner: Arc<dyn EventLogger>) -> (Self, JoinHandle<()>) {
        let (tx, mut rx) = mpsc::unbounded_channel::<(LogEvent, LogLevel)>();
        let drain = tokio::spawn(async move {
            while let Some((event, level)) = rx.recv().await {
                inner.log(event, level);
            }
        });
        (Self { tx }, drain)
    }
}

impl EventLogger for BufferedEventLogger {
    fn log(&self, event: LogEvent, level: LogLevel) {
        // Only fails once the drain task is gone, i.e. during shutdown.
        let _ = self.tx.send((event, level));
    }
}
