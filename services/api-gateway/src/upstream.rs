//! Upstream Forwarder
//!
//! Sends validated requests to third-party REST APIs and maps their outcome
//! onto the gateway's error taxonomy. Success bodies are kept as raw bytes so
//! they can be relayed verbatim.

use anyhow::{Context, Result};
use async_trait::async_trait;
use axum::{
    body::{Body, Bytes},
    http::{header, HeaderValue, StatusCode},
    response::Response,
};
use reqwest::Client;
use std::time::Duration;

use homebase_utils::{HomebaseError, HomebaseResult};

use crate::metrics::Metrics;

const MAX_DETAIL_CHARS: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpstreamMethod {
    Get,
    Post,
    Put,
}

#[derive(Debug, Clone, PartialEq)]
pub enum UpstreamBody {
    Json(serde_json::Value),
    Bytes { content_type: String, data: Bytes },
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamRequest {
    pub service: &'static str,
    pub method: UpstreamMethod,
    pub url: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub body: Option<UpstreamBody>,
}

impl UpstreamRequest {
    pub fn new(service: &'static str, method: UpstreamMethod, url: impl Into<String>) -> Self {
        Self {
            service,
            method,
            url: url.into(),
            query: Vec::new(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn query(mut self, key: &str, value: impl Into<String>) -> Self {
        self.query.push((key.to_string(), value.into()));
        self
    }

    pub fn query_opt(self, key: &str, value: Option<&str>) -> Self {
        match value.map(str::trim).filter(|v| !v.is_empty()) {
            Some(v) => self.query(key, v),
            None => self,
        }
    }

    pub fn header(mut self, key: &str, value: impl Into<String>) -> Self {
        self.headers.push((key.to_string(), value.into()));
        self
    }

    pub fn json(mut self, body: serde_json::Value) -> Self {
        self.body = Some(UpstreamBody::Json(body));
        self
    }

    pub fn bytes(mut self, content_type: impl Into<String>, data: Bytes) -> Self {
        self.body = Some(UpstreamBody::Bytes {
            content_type: content_type.into(),
            data,
        });
        self
    }

    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamResponse {
    pub status: u16,
    pub body: Bytes,
}

impl UpstreamResponse {
    pub fn json(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Transport to third-party APIs. Returns `UpstreamUnreachable` on network
/// failure; any HTTP status is a successful transport.
#[async_trait]
pub trait UpstreamClient: Send + Sync {
    async fn send(&self, request: UpstreamRequest) -> HomebaseResult<UpstreamResponse>;
}

pub struct HttpUpstream {
    client: Client,
}

impl HttpUpstream {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client })
    }
}

#[async_trait]
impl UpstreamClient for HttpUpstream {
    async fn send(&self, request: UpstreamRequest) -> HomebaseResult<UpstreamResponse> {
        let mut builder = match request.method {
            UpstreamMethod::Get => self.client.get(&request.url),
            UpstreamMethod::Post => self.client.post(&request.url),
            UpstreamMethod::Put => self.client.put(&request.url),
        };

        builder = builder
            .header(reqwest::header::ACCEPT, "application/json")
            .query(&request.query);
        for (key, value) in &request.headers {
            builder = builder.header(key.as_str(), value.as_str());
        }
        builder = match request.body {
            Some(UpstreamBody::Json(value)) => builder.json(&value),
            Some(UpstreamBody::Bytes { content_type, data }) => builder
                .header(reqwest::header::CONTENT_TYPE, content_type)
                .body(data),
            None => builder,
        };

        let response = builder.send().await.map_err(|e| {
            let reason = if e.is_timeout() { "request timed out" } else { "connection failed" };
            HomebaseError::upstream_unreachable(request.service, reason)
        })?;

        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(|e| {
            HomebaseError::upstream_unreachable(request.service, format!("body read failed: {}", e))
        })?;

        Ok(UpstreamResponse { status, body })
    }
}

/// Sends `request` and converts a non-success status into the matching error.
/// 401 passes through as an authentication failure, everything else is 502.
pub async fn forward(
    client: &dyn UpstreamClient,
    metrics: &Metrics,
    request: UpstreamRequest,
) -> HomebaseResult<UpstreamResponse> {
    let service = request.service;
    tracing::debug!(service, url = %request.url, "forwarding upstream request");

    let response = match client.send(request).await {
        Ok(response) => response,
        Err(e) => {
            metrics.record_upstream(service, "unreachable");
            return Err(e);
        }
    };

    if response.is_success() {
        metrics.record_upstream(service, "success");
        return Ok(response);
    }

    let details = error_details(&response.body);
    if response.status == 401 {
        metrics.record_upstream(service, "unauthorized");
        return Err(HomebaseError::UpstreamAuth {
            service: service.to_string(),
            details,
        });
    }

    metrics.record_upstream(service, "error");
    Err(HomebaseError::Upstream {
        service: service.to_string(),
        status: response.status,
        details,
    })
}

/// Upstream error body as JSON when possible, else a truncated string.
fn error_details(body: &[u8]) -> Option<serde_json::Value> {
    if body.is_empty() {
        return None;
    }

    serde_json::from_slice(body).ok().or_else(|| {
        let text: String = String::from_utf8_lossy(body)
            .chars()
            .take(MAX_DETAIL_CHARS)
            .collect();
        Some(serde_json::Value::String(text))
    })
}

/// Relays an upstream success body unchanged, adding only headers.
pub fn json_response(
    status: u16,
    body: Bytes,
    cache_control: Option<&str>,
    cache_status: Option<&'static str>,
) -> Response {
    let mut response = Response::new(Body::from(body));
    *response.status_mut() = StatusCode::from_u16(status).unwrap_or(StatusCode::OK);

    let headers = response.headers_mut();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
    if let Some(value) = cache_control.and_then(|v| HeaderValue::from_str(v).ok()) {
        headers.insert(header::CACHE_CONTROL, value);
    }
    if let Some(value) = cache_status {
        headers.insert("x-cache", HeaderValue::from_static(value));
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::RecordingUpstream;

    #[tokio::test]
    async fn test_forward_passes_success_through() {
        let upstream = RecordingUpstream::with_responses(vec![Ok(UpstreamResponse::json(
            200,
            r#"{"features":[]}"#,
        ))]);
        let metrics = Metrics::new().unwrap();

        let request = UpstreamRequest::new("geocoding", UpstreamMethod::Get, "https://x/geo");
        let response = forward(&upstream, &metrics, request).await.unwrap();

        assert_eq!(&response.body[..], br#"{"features":[]}"#);
        assert_eq!(metrics.upstream_count("geocoding", "success"), 1);
    }

    #[tokio::test]
    async fn test_forward_maps_401_to_auth_error() {
        let upstream = RecordingUpstream::with_responses(vec![Ok(UpstreamResponse::json(
            401,
            r#"{"message":"Invalid token"}"#,
        ))]);
        let metrics = Metrics::new().unwrap();

        let request = UpstreamRequest::new("identity", UpstreamMethod::Post, "https://x/inq");
        let err = forward(&upstream, &metrics, request).await.unwrap_err();

        assert_eq!(err.http_status_code(), 401);
        match err {
            HomebaseError::UpstreamAuth { details, .. } => {
                assert_eq!(details.unwrap()["message"], "Invalid token");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_forward_maps_other_failures_to_502() {
        let upstream = RecordingUpstream::with_responses(vec![Ok(UpstreamResponse::json(
            503,
            "maintenance",
        ))]);
        let metrics = Metrics::new().unwrap();

        let request = UpstreamRequest::new("property", UpstreamMethod::Get, "https://x/p");
        let err = forward(&upstream, &metrics, request).await.unwrap_err();

        assert_eq!(err.http_status_code(), 502);
        match err {
            HomebaseError::Upstream { status, details, .. } => {
                assert_eq!(status, 503);
                assert_eq!(details, Some(serde_json::json!("maintenance")));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_forward_propagates_transport_failure() {
        let upstream = RecordingUpstream::with_responses(vec![Err(
            HomebaseError::upstream_unreachable("geocoding", "request timed out"),
        )]);
        let metrics = Metrics::new().unwrap();

        let request = UpstreamRequest::new("geocoding", UpstreamMethod::Get, "https://x/geo");
        let err = forward(&upstream, &metrics, request).await.unwrap_err();

        assert_eq!(err.error_code(), "UPSTREAM_UNREACHABLE");
        assert_eq!(metrics.upstream_count("geocoding", "unreachable"), 1);
    }

    #[test]
    fn test_error_details_truncates_text() {
        let long = "x".repeat(5000);
        let details = error_details(long.as_bytes()).unwrap();
        assert_eq!(details.as_str().unwrap().len(), MAX_DETAIL_CHARS);
        assert!(error_details(b"").is_none());
    }
}
