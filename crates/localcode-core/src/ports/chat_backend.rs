//! Port for the OpenAI-compatible backend.

use std::pin::Pin;

use async_trait::async_trait;
use futures_util::Stream;

use crate::domain::{ChatRequest, ProtocolEvent};
use crate::error::UpstreamError;

/// Sequence of events decoded from one upstream response.
///
/// An `Err` item means the connection failed after the response started;
/// nothing follows it.
pub type EventStream = Pin<Box<dyn Stream<Item = Result<ProtocolEvent, UpstreamError>> + Send>>;

/// An OpenAI-compatible chat backend.
///
/// Implementations own the HTTP connection for the lifetime of the returned
/// stream. Dropping the stream must release the connection, so a client
/// disconnect aborts the upstream call.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Send a chat completion request.
    ///
    /// Streaming requests yield `Chunk`/`Done`/`Error` events; non-streaming
    /// requests yield exactly one `Complete` event. A non-2xx response fails
    /// here, before any event is produced.
    async fn send(&self, request: &ChatRequest) -> Result<EventStream, UpstreamError>;

    /// Ids of the models the backend serves, in backend order. May be empty.
    async fn list_models(&self) -> Result<Vec<String>, UpstreamError>;

    /// Base URL requests are sent to.
    fn base_url(&self) -> &str;
}
