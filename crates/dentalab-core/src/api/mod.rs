//! REST client layer.
//!
//! Requests go through a [`Transport`]; [`ApiClient`] turns HTTP statuses
//! into [`ApiError`] values. [`HttpTransport`] talks to the real backend,
//! [`FakeBackend`] answers from scripted responses.

mod fake;
mod http;
mod query;
mod resource;

pub use fake::*;
pub use http::*;
pub use query::*;
pub use resource::*;

use std::collections::BTreeMap;
use std::fmt;

use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

/// Transport-level failures (nothing came back from the backend).
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Server unreachable: {0}")]
    Unreachable(String),
}

/// Errors surfaced by backend calls.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Unauthorized")]
    Unauthorized,

    #[error("Access denied{}", suffix(.0))]
    Forbidden(Option<String>),

    #[error("Not found{}", suffix(.0))]
    NotFound(Option<String>),

    #[error("Validation failed{}", suffix(.message))]
    Validation {
        message: Option<String>,
        fields: BTreeMap<String, String>,
    },

    #[error("Conflict{}", suffix(.0))]
    Conflict(Option<String>),

    #[error("Server error ({status}){}", suffix(.message))]
    Server { status: u16, message: Option<String> },

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("Unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
}

fn suffix(message: &Option<String>) -> String {
    match message {
        Some(m) => format!(": {}", m),
        None => String::new(),
    }
}

impl ApiError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized)
    }

    /// Message provided by the backend, if it sent one.
    pub fn backend_message(&self) -> Option<&str> {
        match self {
            ApiError::Forbidden(m) | ApiError::NotFound(m) | ApiError::Conflict(m) => m.as_deref(),
            ApiError::Validation { message, .. } | ApiError::Server { message, .. } => {
                message.as_deref()
            }
            _ => None,
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

/// HTTP method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A backend request, independent of the transport.
#[derive(Clone)]
pub struct ApiRequest {
    pub method: Method,
    /// Path below the API base URL, starting with `/`.
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
    pub bearer: Option<String>,
    /// Sent as `X-Request-Id`.
    pub request_id: Uuid,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            bearer: None,
            request_id: Uuid::new_v4(),
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::Post, path).with_body(body)
    }

    pub fn put(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::Put, path).with_body(body)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_query(mut self, query: Vec<(String, String)>) -> Self {
        self.query = query;
        self
    }

    pub fn with_bearer(mut self, token: Option<&str>) -> Self {
        self.bearer = token.map(str::to_string);
        self
    }
}

impl fmt::Debug for ApiRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiRequest")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("query", &self.query)
            .field("has_body", &self.body.is_some())
            .field("authenticated", &self.bearer.is_some())
            .field("request_id", &self.request_id)
            .finish()
    }
}

/// Raw backend response. Empty bodies are `Value::Null`.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    pub fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }

    pub fn ok(body: Value) -> Self {
        Self::new(200, body)
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Something that can carry an [`ApiRequest`] to the backend.
pub trait Transport {
    fn send(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError>;
}

/// Status-aware client over a transport.
pub struct ApiClient<T> {
    transport: T,
}

impl<T: Transport> ApiClient<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Send a request and return the JSON body of a successful response.
    pub fn send(&self, request: ApiRequest) -> ApiResult<Value> {
        debug!(
            request_id = %request.request_id,
            method = request.method.as_str(),
            path = %request.path,
            "api request"
        );
        let response = self.transport.send(&request).map_err(|e| {
            warn!(request_id = %request.request_id, error = %e, "transport failure");
            e
        })?;
        debug!(
            request_id = %request.request_id,
            status = response.status,
            "api response"
        );
        classify(response)
    }

    /// Send a request and deserialize the response body.
    pub fn send_json<R: DeserializeOwned>(&self, request: ApiRequest) -> ApiResult<R> {
        let body = self.send(request)?;
        Ok(serde_json::from_value(body)?)
    }
}

/// Map a response to its body or an [`ApiError`].
pub fn classify(response: ApiResponse) -> ApiResult<Value> {
    if response.is_success() {
        return Ok(response.body);
    }
    let message = extract_message(&response.body);
    Err(match response.status {
        401 => ApiError::Unauthorized,
        403 => ApiError::Forbidden(message),
        404 => ApiError::NotFound(message),
        400 | 422 => ApiError::Validation {
            message,
            fields: extract_field_errors(&response.body),
        },
        409 => ApiError::Conflict(message),
        status => ApiError::Server { status, message },
    })
}

/// `message` or `error` from a JSON body, or the body itself when it is a
/// plain string.
fn extract_message(body: &Value) -> Option<String> {
    let candidate = match body {
        Value::String(s) => Some(s.as_str()),
        Value::Object(map) => map
            .get("message")
            .and_then(Value::as_str)
            .or_else(|| map.get("error").and_then(Value::as_str)),
        _ => None,
    };
    candidate
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
}

/// Per-field messages from `{"errors": {"field": ["msg", ...]}}` or
/// `{"errors": {"field": "msg"}}`.
fn extract_field_errors(body: &Value) -> BTreeMap<String, String> {
    let mut fields = BTreeMap::new();
    if let Some(errors) = body.get("errors").and_then(Value::as_object) {
        for (field, value) in errors {
            let message = match value {
                Value::String(s) => Some(s.clone()),
                Value::Array(items) => items.first().and_then(Value::as_str).map(str::to_string),
                _ => None,
            };
            if let Some(message) = message {
                fields.insert(field.clone(), message);
            }
        }
    }
    fields
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_classify_success() {
        let body = classify(ApiResponse::ok(json!({"id": 1}))).unwrap();
        assert_eq!(body["id"], 1);
    }

    #[test]
    fn test_classify_statuses() {
        assert!(classify(ApiResponse::new(401, Value::Null)).unwrap_err().is_unauthorized());
        assert!(matches!(
            classify(ApiResponse::new(403, json!({"message": "nope"}))),
            Err(ApiError::Forbidden(Some(ref m))) if m == "nope"
        ));
        assert!(matches!(
            classify(ApiResponse::new(404, Value::Null)),
            Err(ApiError::NotFound(None))
        ));
        assert!(matches!(
            classify(ApiResponse::new(409, json!({"error": "stale"}))),
            Err(ApiError::Conflict(Some(_)))
        ));
        assert!(matches!(
            classify(ApiResponse::new(503, json!("maintenance"))),
            Err(ApiError::Server { status: 503, .. })
        ));
    }

    #[test]
    fn test_validation_fields() {
        let err = classify(ApiResponse::new(
            422,
            json!({
                "message": "The given data was invalid.",
                "errors": {"email": ["The email has already been taken."], "name": "Required"}
            }),
        ))
        .unwrap_err();

        match err {
            ApiError::Validation { message, fields } => {
                assert_eq!(message.as_deref(), Some("The given data was invalid."));
                assert_eq!(fields["email"], "The email has already been taken.");
                assert_eq!(fields["name"], "Required");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_blank_message_ignored() {
        let err = classify(ApiResponse::new(500, json!({"message": "  "}))).unwrap_err();
        assert_eq!(err.backend_message(), None);
        assert_eq!(err.to_string(), "Server error (500)");
    }

    #[test]
    fn test_request_debug_hides_token() {
        let request = ApiRequest::get("/auth/me").with_bearer(Some("secret-token"));
        let debug = format!("{:?}", request);
        assert!(!debug.contains("secret-token"));
        assert!(debug.contains("authenticated: true"));
    }
}
