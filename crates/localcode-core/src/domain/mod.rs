//! Domain types shared by every layer of the relay.
//!
//! These types are pure data: no I/O, no HTTP types.

mod chat;
mod protocol;
mod usage;

pub use chat::ChatRequest;
pub use protocol::ProtocolEvent;
pub use usage::UsageStats;
