//! OpenAI API data models for the proxy's own endpoints.
//!
//! Chat payloads are relayed as JSON values and never typed here; this
//! module only covers the bodies the proxy produces itself.

use localcode_core::UpstreamError;
use serde::Serialize;

/// Provider name reported by `/health`.
pub const PROVIDER_NAME: &str = "LocalCode Middleware";

// =============================================================================
// Health
// =============================================================================

/// Body of `GET /health`.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub provider: &'static str,
    pub backend_url: String,
}

impl HealthResponse {
    pub fn ok(backend_url: impl Into<String>) -> Self {
        Self {
            status: "ok",
            provider: PROVIDER_NAME,
            backend_url: backend_url.into(),
        }
    }
}

// =============================================================================
// Models Endpoint Types
// =============================================================================

/// Response from /v1/models endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ModelsResponse {
    pub object: String,
    pub data: Vec<ModelInfo>,
}

impl ModelsResponse {
    /// Build the list body from backend model ids, keeping their order.
    pub fn from_ids(ids: Vec<String>) -> Self {
        Self {
            object: "list".to_string(),
            data: ids.into_iter().map(ModelInfo::from).collect(),
        }
    }
}

/// Information about a single model (OpenAI format).
#[derive(Debug, Clone, Serialize)]
pub struct ModelInfo {
    pub id: String,
    pub object: String,
    pub owned_by: String,
}

impl From<String> for ModelInfo {
    fn from(id: String) -> Self {
        Self {
            id,
            object: "model".to_string(),
            owned_by: "backend".to_string(),
        }
    }
}

// =============================================================================
// Error Response Types
// =============================================================================

/// Error response matching OpenAI format.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

/// Error detail within an error response.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorDetail {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub r#type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl ErrorResponse {
    /// Create a new error response.
    pub fn new(message: impl Into<String>, error_type: impl Into<String>) -> Self {
        Self {
            error: ErrorDetail {
                message: message.into(),
                r#type: Some(error_type.into()),
                code: None,
            },
        }
    }

    /// Create an error response with a code.
    pub fn with_code(
        message: impl Into<String>,
        error_type: impl Into<String>,
        code: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorDetail {
                message: message.into(),
                r#type: Some(error_type.into()),
                code: Some(code.into()),
            },
        }
    }

    /// Bare `{"error": {"message": ...}}` body, used for the no-response sentinel.
    pub fn message_only(message: impl Into<String>) -> Self {
        Self {
            error: ErrorDetail {
                message: message.into(),
                r#type: None,
                code: None,
            },
        }
    }

    /// Create an error response for an unparsable inbound body.
    pub fn invalid_request(reason: &str) -> Self {
        Self::new(format!("Invalid request body: {reason}"), "invalid_request")
    }
}

impl From<&UpstreamError> for ErrorResponse {
    fn from(err: &UpstreamError) -> Self {
        Self::with_code(err.to_string(), "upstream_error", err.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_health_shape() {
        let body = serde_json::to_value(HealthResponse::ok("http://localhost:8080/v1")).unwrap();
        assert_eq!(
            body,
            json!({
                "status": "ok",
                "provider": "LocalCode Middleware",
                "backend_url": "http://localhost:8080/v1"
            })
        );
    }

    #[test]
    fn test_models_response_keeps_order() {
        let body =
            serde_json::to_value(ModelsResponse::from_ids(vec!["b".into(), "a".into()])).unwrap();
        assert_eq!(body["object"], "list");
        assert_eq!(body["data"][0]["id"], "b");
        assert_eq!(body["data"][1]["id"], "a");
        assert_eq!(body["data"][0]["object"], "model");
    }

    #[test]
    fn test_sentinel_has_only_message() {
        let body = serde_json::to_value(ErrorResponse::message_only("No response from upstream"))
            .unwrap();
        assert_eq!(body, json!({"error": {"message": "No response from upstream"}}));
    }

    #[test]
    fn test_from_upstream_error() {
        let err = UpstreamError::Http {
            status: 429,
            body: "slow down".into(),
        };
        let body = serde_json::to_value(ErrorResponse::from(&err)).unwrap();
        assert_eq!(
            body,
            json!({"error": {
                "message": "Upstream returned HTTP 429: slow down",
                "type": "upstream_error",
                "code": "upstream_http_error"
            }})
        );
    }
}
