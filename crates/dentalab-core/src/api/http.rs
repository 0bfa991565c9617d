//! Blocking HTTP transport backed by reqwest.

use std::time::Duration;

use serde_json::Value;

use super::{ApiRequest, ApiResponse, Method, Transport, TransportError};
use crate::config::ClientConfig;

/// Transport against the real REST backend.
pub struct HttpTransport {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl HttpTransport {
    /// Build a transport for `base_url` (e.g. `https://lab.example.com/api`).
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self, TransportError> {
        Self::new(
            &config.api_base_url,
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }
}

impl Transport for HttpTransport {
    fn send(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError> {
        let url = self.url(&request.path);
        let mut builder = match request.method {
            Method::Get => self.client.get(&url),
            Method::Post => self.client.post(&url),
            Method::Put => self.client.put(&url),
            Method::Delete => self.client.delete(&url),
        };

        builder = builder
            .header(reqwest::header::ACCEPT, "application/json")
            .header("X-Request-Id", request.request_id.to_string());
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(token) = &request.bearer {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let resp = builder.send()?;
        let status = resp.status().as_u16();
        let text = resp.text()?;

        Ok(ApiResponse {
            status,
            body: parse_body(&text),
        })
    }
}

/// JSON when possible, the raw text otherwise, `Null` when empty.
fn parse_body(text: &str) -> Value {
    if text.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_join() {
        let transport = HttpTransport::new("https://lab.example.com/api/", Duration::from_secs(5)).unwrap();
        assert_eq!(transport.base_url(), "https://lab.example.com/api");
        assert_eq!(transport.url("/patients"), "https://lab.example.com/api/patients");
        assert_eq!(transport.url("patients"), "https://lab.example.com/api/patients");
    }

    #[test]
    fn test_parse_body() {
        assert_eq!(parse_body(""), Value::Null);
        assert_eq!(parse_body("{\"a\":1}")["a"], 1);
        assert_eq!(parse_body("Bad Gateway"), Value::String("Bad Gateway".into()));
    }
}
