//! Axum HTTP server for the instrumentation proxy.
//!
//! This module provides the `serve()` function that runs the proxy server
//! using a pre-bound TcpListener, plus `create_router()` for tests.

use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    Json, Router,
    body::Body,
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use bytes::Bytes;
use futures_util::StreamExt;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, error, info, info_span};
use uuid::Uuid;

use localcode_core::{
    ChatPipeline, ChatRequest, NO_RESPONSE_MESSAGE, PipelineResponse, RelayStream, UpstreamError,
};

use crate::models::{ErrorResponse, HealthResponse, ModelsResponse};

/// Shared application state for the proxy server.
#[derive(Clone)]
pub struct AppState {
    pipeline: Arc<ChatPipeline>,
}

impl AppState {
    pub fn new(pipeline: ChatPipeline) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
        }
    }

    pub fn pipeline(&self) -> &ChatPipeline {
        &self.pipeline
    }
}

/// Build the proxy router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/v1/models", get(list_models))
        .route("/v1/chat/completions", post(chat_completions))
        .with_state(state)
}

/// Start the proxy server with a pre-bound listener.
///
/// Runs until the cancellation token is triggered. In-flight streams are
/// allowed to finish during graceful shutdown.
pub async fn serve(
    listener: TcpListener,
    state: AppState,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    let addr = listener.local_addr()?;
    let backend_url = state.pipeline().backend().base_url().to_string();

    let app = create_router(state);

    info!("Proxy listening on {addr}");
    info!("Forwarding to backend {backend_url}");
    info!("Configure your client to use: http://{addr}/v1");

    axum::serve(listener, app)
        .with_graceful_shutdown(cancel.cancelled_owned())
        .await?;

    info!("Proxy server shut down");
    Ok(())
}

/// Health check endpoint.
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(HealthResponse::ok(state.pipeline().backend().base_url()))
}

/// Relay the backend's model list in OpenAI format.
async fn list_models(State(state): State<AppState>) -> Response {
    debug!("GET /v1/models");

    match state.pipeline().backend().list_models().await {
        Ok(ids) => Json(ModelsResponse::from_ids(ids)).into_response(),
        Err(e) => {
            error!("Failed to list models: {e}");
            (StatusCode::BAD_GATEWAY, Json(ErrorResponse::from(&e))).into_response()
        }
    }
}

/// Handle chat completions: log, forward and relay.
async fn chat_completions(State(state): State<AppState>, body: Bytes) -> Response {
    let request_id = Uuid::new_v4();
    let span = info_span!("chat_completion", request_id = %request_id);

    async move {
        debug!("POST /v1/chat/completions");

        let request = match ChatRequest::from_slice(&body) {
            Ok(req) => req,
            Err(e) => {
                error!("Failed to parse request: {e}");
                return (
                    StatusCode::BAD_REQUEST,
                    Json(ErrorResponse::invalid_request(&e.to_string())),
                )
                    .into_response();
            }
        };

        match state.pipeline().handle(request).await {
            PipelineResponse::Stream(frames) => sse_response(frames),
            PipelineResponse::Complete(payload) => Json(payload).into_response(),
            PipelineResponse::NoResponse => {
                Json(ErrorResponse::message_only(NO_RESPONSE_MESSAGE)).into_response()
            }
            PipelineResponse::Failed(e) => upstream_error_response(&e),
        }
    }
    .instrument(span)
    .await
}

/// Wrap relay frames in an SSE response.
fn sse_response(frames: RelayStream) -> Response {
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/event-stream")
        .header(header::CACHE_CONTROL, "no-cache")
        .header(header::CONNECTION, "keep-alive")
        .header("x-accel-buffering", "no") // Disable nginx buffering
        .body(Body::from_stream(frames.map(Ok::<_, Infallible>)))
        .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
}

/// Map a failed non-streaming call to a status and OpenAI error body.
fn upstream_error_response(err: &UpstreamError) -> Response {
    let status = match err {
        UpstreamError::Http { status, .. } => {
            StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
        }
        UpstreamError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
        _ => StatusCode::BAD_GATEWAY,
    };

    (status, Json(ErrorResponse::from(err))).into_response()
}
