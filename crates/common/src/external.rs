//! Outbound HTTP helper for calling third-party services.
//!
//! A `SendRequest` describes one call: method, url, headers, JSON body and the
//! status code that counts as success. The response body is decoded according
//! to `DecodeMethod`.

use std::collections::HashMap;

use reqwest::{Method, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;
use tracing::{debug, error};

#[derive(Debug, Error)]
pub enum ExternalError {
    #[error("network error: {0}")]
    Network(String),
    #[error("{name}: unexpected status {status}: {body}")]
    UnexpectedStatus { name: String, status: u16, body: String },
    #[error("parse error: {0}")]
    Parse(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeMethod {
    Json,
    Text,
}

#[derive(Debug, Clone)]
pub struct SendRequest<B: Serialize> {
    /// Short label used in logs
    pub name: String,
    pub method: Method,
    pub url: String,
    pub headers: HashMap<String, String>,
    pub success_code: StatusCode,
    pub body: Option<B>,
    pub decode: DecodeMethod,
}

impl<B: Serialize> SendRequest<B> {
    pub fn new(name: &str, method: Method, url: &str) -> Self {
        Self {
            name: name.to_string(),
            method,
            url: url.to_string(),
            headers: HashMap::new(),
            success_code: StatusCode::OK,
            body: None,
            decode: DecodeMethod::Json,
        }
    }

    pub fn header(mut self, key: &str, value: &str) -> Self {
        self.headers.insert(key.to_string(), value.to_string());
        self
    }

    pub fn json_body(mut self, body: B) -> Self {
        self.body = Some(body);
        self
    }

    pub fn expect_status(mut self, code: StatusCode) -> Self {
        self.success_code = code;
        self
    }

    pub fn decode_with(mut self, decode: DecodeMethod) -> Self {
        self.decode = decode;
        self
    }

    /// Send the request and decode the body into `T`.
    ///
    /// With `DecodeMethod::Text` the raw body is wrapped as a JSON string before
    /// decoding, so `T = String` works for plain-text endpoints.
    pub async fn send<T: DeserializeOwned>(&self, client: &reqwest::Client) -> Result<T, ExternalError> {
        let mut req = client.request(self.method.clone(), &self.url);
        for (k, v) in &self.headers {
            req = req.header(k.as_str(), v.as_str());
        }
        if let Some(body) = &self.body {
            req = req.json(body);
        }
        debug!(name = %self.name, method = %self.method, url = %self.url, "external_request");

        let resp = req.send().await.map_err(|e| {
            error!(name = %self.name, err = %e, "external request failed");
            ExternalError::Network(e.to_string())
        })?;
        let status = resp.status();
        let text = resp.text().await.map_err(|e| ExternalError::Network(e.to_string()))?;
        debug!(name = %self.name, status = status.as_u16(), "external_response");

        if status != self.success_code {
            return Err(ExternalError::UnexpectedStatus { name: self.name.clone(), status: status.as_u16(), body: text });
        }
        decode_body(&text, self.decode)
    }
}

fn decode_body<T: DeserializeOwned>(text: &str, decode: DecodeMethod) -> Result<T, ExternalError> {
    match decode {
        DecodeMethod::Json => serde_json::from_str(text).map_err(|e| ExternalError::Parse(e.to_string())),
        DecodeMethod::Text => serde_json::from_value(serde_json::Value::String(text.to_string()))
            .map_err(|e| ExternalError::Parse(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_json_body() {
        let v: serde_json::Value = decode_body(r#"{"ok":true}"#, DecodeMethod::Json).unwrap();
        assert_eq!(v["ok"], true);
    }

    #[test]
    fn decodes_text_body_as_string() {
        let s: String = decode_body("pong", DecodeMethod::Text).unwrap();
        assert_eq!(s, "pong");
    }

    #[test]
    fn malformed_json_is_parse_error() {
        let r: Result<serde_json::Value, _> = decode_body("{oops", DecodeMethod::Json);
        assert!(matches!(r, Err(ExternalError::Parse(_))));
    }

    #[test]
    fn builder_sets_fields() {
        let req = SendRequest::new("notify", Method::POST, "http://localhost/hook")
            .header("x-api-key", "k")
            .json_body(serde_json::json!({"a": 1}))
            .expect_status(StatusCode::CREATED);
        assert_eq!(req.success_code, StatusCode::CREATED);
        assert_eq!(req.headers.get("x-api-key").map(String::as_str), Some("k"));
        assert!(req.body.is_some());
    }

    #[tokio::test]
    async fn unreachable_host_is_network_error() {
        let client = reqwest::Client::new();
        let req: SendRequest<()> = SendRequest::new("unreachable", Method::GET, "http://127.0.0.1:1/unreachable");
        let r: Result<serde_json::Value, _> = req.send(&client).await;
        assert!(matches!(r, Err(ExternalError::Network(_))));
    }
}
