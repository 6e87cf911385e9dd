//! Shared helpers for proxy integration tests.

#![allow(dead_code)]

use std::io;
use std::sync::{Arc, Mutex};

use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response};
use http_body_util::BodyExt;
use tower::ServiceExt;

use localcode_core::{ChatPipeline, EventLogger, EventType, LogEvent, LogLevel};
use localcode_proxy::{AppState, ClientConfig, OpenAiClient, create_router};

/// Event logger that records everything for assertions.
#[derive(Default)]
pub struct RecordingLogger {
    events: Mutex<Vec<(LogEvent, LogLevel)>>,
}

impl RecordingLogger {
    pub fn events(&self) -> Vec<(LogEvent, LogLevel)> {
        self.events.lock().unwrap().clone()
    }

    pub fn types(&self) -> Vec<EventType> {
        self.events().iter().map(|(e, _)| e.event_type()).collect()
    }
}

impl EventLogger for RecordingLogger {
    fn log(&self, event: LogEvent, level: LogLevel) {
        self.events.lock().unwrap().push((event, level));
    }
}

/// Router wired to a real client pointed at `backend_url`.
pub fn app_for(backend_url: &str) -> (Router, Arc<RecordingLogger>) {
    app_with_config(ClientConfig::new(backend_url))
}

/// Router wired to a real client built from `config`.
pub fn app_with_config(config: ClientConfig) -> (Router, Arc<RecordingLogger>) {
    let logger = Arc::new(RecordingLogger::default());
    let client = OpenAiClient::new(config).unwrap();
    let pipeline = ChatPipeline::new(Arc::new(client), logger.clone());
    (create_router(AppState::new(pipeline)), logger)
}

pub fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

/// Send one request and return the response with its full body.
pub async fn send(app: Router, request: Request<Body>) -> (Response<()>, String) {
    let response = app.oneshot(request).await.unwrap();
    let (parts, body) = response.into_parts();
    let bytes = body.collect().await.unwrap().to_bytes();
    (
        Response::from_parts(parts, ()),
        String::from_utf8(bytes.to_vec()).unwrap(),
    )
}

/// Writer that keeps tracing output in memory.
#[derive(Clone, Default)]
pub struct SharedBuf(Arc<Mutex<Vec<u8>>>);

impl SharedBuf {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
