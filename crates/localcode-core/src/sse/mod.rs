//! Server-Sent Events framing.
//!
//! Inbound: [`SseDecoder`] turns upstream bytes into [`ProtocolEvent`]s.
//! Outbound: [`frame`] encodes the `data: ...\n\n` frames sent to clients.
//!
//! [`ProtocolEvent`]: crate::ProtocolEvent

mod decoder;
pub mod frame;
mod stream;

pub use decoder::{DATA_PREFIX, DONE_SENTINEL, SseDecoder};
pub use stream::decode_stream;
