//! Event logger trait for structured observability events.

use crate::events::{LogEvent, LogLevel};

/// Sink for [`LogEvent`]s.
///
/// Called from inside the streaming pipeline, so implementations should hand
/// the event off (channel, buffered writer) rather than do slow I/O inline.
#[cfg_attr(test, mockall::automock)]
pub trait EventLogger: Send + Sync {
    fn log(&self, event: LogEvent, level: LogLevel);
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLogger;

impl NoopLogger {
    pub const fn new() -> Self {
        Self
    }
}

impl EventLogger for NoopLogger {
    fn log(&self, _event: LogEvent, _level: LogLevel) {}
}
