//! Test doubles shared by the unit tests of this crate.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use futures_util::stream;

use crate::domain::{ChatRequest, ProtocolEvent};
use crate::error::UpstreamError;
use crate::events::{EventType, LogEvent, LogLevel};
use crate::ports::{ChatBackend, EventLogger, EventStream};

/// Logger that keeps every event for later assertions.
#[derive(Default)]
pub struct RecordingLogger {
    events: Mutex<Vec<(LogEvent, LogLevel)>>,
}

impl RecordingLogger {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

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

/// Build an [`EventStream`] from scripted items.
pub fn scripted(items: Vec<Result<ProtocolEvent, UpstreamError>>) -> EventStream {
    Box::pin(stream::iter(items))
}

/// Backend that answers every request with the same script.
pub struct ScriptedBackend {
    script: Mutex<Option<Result<Vec<Result<ProtocolEvent, UpstreamError>>, UpstreamError>>>,
    pub seen: Mutex<Vec<ChatRequest>>,
}

impl ScriptedBackend {
    pub fn events(items: Vec<Result<ProtocolEvent, UpstreamError>>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(Some(Ok(items))),
            seen: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(err: UpstreamError) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(Some(Err(err))),
            seen: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl ChatBackend for ScriptedBackend {
    async fn send(&self, request: &ChatRequest) -> Result<EventStream, UpstreamError> {
        self.seen.lock().unwrap().push(request.clone());
        match self.script.lock().unwrap().take() {
            Some(Ok(items)) => Ok(scripted(items)),
            Some(Err(e)) => Err(e),
            None => Ok(scripted(Vec::new())),
        }
    }

    async fn list_models(&self) -> Result<Vec<String>, UpstreamError> {
        Ok(vec!["scripted-model".to_string()])
    }

    fn base_url(&self) -> &str {
        "http://scripted.test/v1"
    }
}
