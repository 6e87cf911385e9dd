//! Port definitions (trait abstractions) for external systems.
//!
//! Ports define what the pipeline expects from the outside world. They
//! contain no implementation details and use only domain types.
//!
//! # Design Rules
//!
//! - No HTTP client or server types in any signature
//! - Logging is fire-and-forget: `EventLogger::log` must not block

pub mod chat_backend;
pub mod event_logger;

pub use chat_backend::{ChatBackend, EventStream};
pub use event_logger::{EventLogger, NoopLogger};
