//! Upstream failure taxonomy.
//!
//! Malformed SSE lines are not errors here: they travel through the pipeline
//! as [`ProtocolEvent::Error`](crate::ProtocolEvent::Error). A non-streaming
//! call that yields no `Complete` event is reported as
//! [`PipelineResponse::NoResponse`](crate::PipelineResponse::NoResponse).

use thiserror::Error;

/// Errors raised while talking to the backend.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// The backend answered with a non-2xx status.
    #[error("Upstream returned HTTP {status}: {body}")]
    Http {
        /// HTTP status code
        status: u16,
        /// Response body as text
        body: String,
    },

    /// Connection failure or a dropped stream.
    #[error("Upstream transport error: {0}")]
    Transport(String),

    /// The request exceeded the client timeout.
    #[error("Upstream request timed out: {0}")]
    Timeout(String),

    /// The backend answered 2xx with a body that could not be parsed.
    #[error("Invalid upstream response: {0}")]
    InvalidResponse(String),

    /// The backend listed no models.
    #[error("No models available from backend")]
    NoModels,
}

impl UpstreamError {
    /// Stable error code for `{"error": {"code": ...}}` bodies.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Http { .. } => "upstream_http_error",
            Self::Transport(_) => "upstream_transport_error",
            Self::Timeout(_) => "upstream_timeout",
            Self::InvalidResponse(_) => "upstream_invalid_response",
            Self::NoModels => "no_models",
        }
    }

    /// True for connection-level failures, as opposed to an HTTP status.
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Timeout(_))
    }
}
