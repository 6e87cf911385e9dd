//! reqwest-backed [`ChatBackend`] for OpenAI-compatible servers.
//!
//! Streaming responses are handed to the core SSE decoder as a lazy byte
//! stream; the connection lives inside the returned [`EventStream`] and is
//! released when that stream is dropped.

use std::time::Duration;

use async_trait::async_trait;
use futures_util::{TryStreamExt, stream};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, RequestBuilder, Response};
use serde_json::Value;
use tracing::{debug, warn};

use localcode_core::{ChatBackend, ChatRequest, EventStream, ProtocolEvent, UpstreamError, decode_stream};

use crate::catalog::normalize_model_ids;

/// Default backend: the hosted OpenCode Zen gateway.
pub const DEFAULT_BACKEND_URL: &str = "https://opencode.ai/zen/v1";

/// Ceiling on waiting for upstream data; generation can be slow.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);
const MODELS_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection settings for [`OpenAiClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL without trailing slash, e.g. `http://localhost:8080/v1`.
    pub backend_url: String,
    /// Bearer token; empty means no `Authorization` header.
    pub api_key: String,
    /// Read timeout for upstream responses.
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn new(backend_url: impl Into<String>) -> Self {
        let backend_url = backend_url.into().trim_end_matches('/').to_string();
        Self {
            backend_url,
            api_key: String::new(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = api_key.into();
        self
    }

    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BACKEND_URL)
    }
}

/// OpenAI-compatible backend client.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    http: Client,
    config: ClientConfig,
}

impl OpenAiClient {
    pub fn new(config: ClientConfig) -> Result<Self, UpstreamError> {
        let http = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .read_timeout(config.timeout)
            .pool_max_idle_per_host(10)
            .build()
            .map_err(map_reqwest_error)?;

        Ok(Self { http, config })
    }

    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.config.backend_url)
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        let builder = builder.header(CONTENT_TYPE, "application/json");
        if self.config.api_key.is_empty() {
            builder
        } else {
            builder.bearer_auth(&self.config.api_key)
        }
    }
}

#[async_trait]
impl ChatBackend for OpenAiClient {
    async fn send(&self, request: &ChatRequest) -> Result<EventStream, UpstreamError> {
        let url = self.endpoint("chat/completions");
        debug!(url = %url, stream = request.stream, "Sending chat completion upstream");

        let response = self
            .authorize(self.http.post(&url))
            .json(request)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let response = ensure_success(response).await?;

        if request.stream {
            let bytes = response.bytes_stream().map_err(map_reqwest_error);
            return Ok(Box::pin(decode_stream(bytes)));
        }

        let payload: Value = response.json().await.map_err(map_reqwest_error)?;
        Ok(Box::pin(stream::once(async move {
            Ok(ProtocolEvent::Complete(payload))
        })))
    }

    async fn list_models(&self) -> Result<Vec<String>, UpstreamError> {
        let url = self.endpoint("models");
        debug!(url = %url, "Fetching backend models");

        let response = self
            .authorize(self.http.get(&url))
            .timeout(MODELS_TIMEOUT)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let response = ensure_success(response).await?;

        let body: Value = response.json().await.map_err(map_reqwest_error)?;
        Ok(normalize_model_ids(&body))
    }

    fn base_url(&self) -> &str {
        &self.config.backend_url
    }
}

/// Turn a non-2xx response into [`UpstreamError::Http`] carrying its body.
async fn ensure_success(response: Response) -> Result<Response, UpstreamError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    warn!(status = status.as_u16(), "Upstream returned error status");
    Err(UpstreamError::Http {
        status: status.as_u16(),
        body,
    })
}

fn map_reqwest_error(err: reqwest::Error) -> UpstreamError {
    if err.is_timeout() {
        UpstreamError::Timeout(err.to_string())
    } else if err.is_decode() {
        UpstreamError::InvalidResponse(err.to_string())
    } else {
        UpstreamError::Transport(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::StreamExt;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const SSE_BODY: &str = "data: {\"choices\":[{\"delta\":{\"content\":\"Hi\"}}]}\n\n\
                            data: {\"choices\":[{\"delta\":{\"content\":\"!\"}}]}\n\n\
                            data: [DONE]\n\n";

    fn request(stream: bool) -> ChatRequest {
        serde_json::from_value(json!({
            "model": "test",
            "stream": stream,
            "messages": [{"role": "user", "content": "Hi"}]
        }))
        .unwrap()
    }

    fn client_for(server: &MockServer, api_key: &str) -> OpenAiClient {
        let config = ClientConfig::new(format!("{}/v1/", server.uri())).with_api_key(api_key);
        OpenAiClient::new(config).unwrap()
    }

    #[test]
    fn test_config_trims_trailing_slash() {
        let config = ClientConfig::new("http://localhost:8080/v1/");
        assert_eq!(config.backend_url, "http://localhost:8080/v1");
        assert!(config.api_key.is_empty());
        assert_eq!(config.timeout, DEFAULT_TIMEOUT);
    }

    #[tokio::test]
    async fn test_streaming_response_is_decoded() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200).set_body_raw(SSE_BODY, "text/event-stream"),
            )
            .mount(&server)
            .await;

        let client = client_for(&server, "");
        let events: Vec<_> = client.send(&request(true)).await.unwrap().collect().await;
        let events: Vec<ProtocolEvent> = events.into_iter().map(Result::unwrap).collect();

        assert_eq!(events.len(), 3);
        assert_eq!(
            events[0],
            ProtocolEvent::Chunk(json!({"choices": [{"delta": {"content": "Hi"}}]}))
        );
        assert!(matches!(events[1], ProtocolEvent::Chunk(_)));
        assert_eq!(events[2], ProtocolEvent::Done);
    }

    #[tokio::test]
    async fn test_non_streaming_yields_single_complete() {
        let server = MockServer::start().await;
        let payload = json!({"choices": [{"message": {"content": "Hello!"}, "finish_reason": "stop"}]});
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&payload))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, "sk-test");
        let events: Vec<_> = client.send(&request(false)).await.unwrap().collect().await;

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].as_ref().unwrap(), &ProtocolEvent::Complete(payload));
    }

    #[tokio::test]
    async fn test_empty_key_sends_no_auth_header() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
            .mount(&server)
            .await;

        let client = client_for(&server, "");
        let _ = client.send(&request(false)).await.unwrap();

        let received = server.received_requests().await.unwrap();
        assert_eq!(received.len(), 1);
        assert!(received[0].headers.get("authorization").is_none());
        assert_eq!(
            received[0].headers.get("content-type").unwrap(),
            "application/json"
        );
        let body: Value = serde_json::from_slice(&received[0].body).unwrap();
        assert_eq!(body["model"], "test");
        assert_eq!(body["stream"], false);
    }

    #[tokio::test]
    async fn test_error_status_fails_before_events() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(401).set_body_string("bad key"))
            .mount(&server)
            .await;

        let client = client_for(&server, "sk-wrong");
        let Err(err) = client.send(&request(true)).await else {
            panic!("expected upstream error");
        };
        match err {
            UpstreamError::Http { status, body } => {
                assert_eq!(status, 401);
                assert_eq!(body, "bad key");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_slow_backend_is_timeout_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"choices": []}))
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let config = ClientConfig::new(format!("{}/v1", server.uri()))
            .with_timeout(Duration::from_millis(200));
        let client = OpenAiClient::new(config).unwrap();

        let Err(err) = client.send(&request(false)).await else {
            panic!("expected timeout");
        };
        assert!(matches!(err, UpstreamError::Timeout(_)), "got {err}");
        assert!(err.is_transport());
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport_error() {
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let client =
            OpenAiClient::new(ClientConfig::new(format!("http://127.0.0.1:{port}/v1"))).unwrap();

        let Err(err) = client.send(&request(false)).await else {
            panic!("expected transport error");
        };
        assert!(err.is_transport(), "got {err}");
    }

    #[tokio::test]
    async fn test_list_models_data_shape() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/models"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "object": "list",
                "data": [{"id": "a", "object": "model"}, {"id": "b", "object": "model"}]
            })))
            .mount(&server)
            .await;

        let client = client_for(&server, "");
        assert_eq!(client.list_models().await.unwrap(), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_list_models_bare_list_shape() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/models"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": "local"}])))
            .mount(&server)
            .await;

        let client = client_for(&server, "");
        assert_eq!(client.list_models().await.unwrap(), vec!["local"]);
    }

    #[tokio::test]
    async fn test_list_models_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/models"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = client_for(&server, "");
        let err = client.list_models().await.unwrap_err();
        assert!(matches!(err, UpstreamError::Http { status: 503, .. }));
    }
}
