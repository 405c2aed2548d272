//! Shared fixtures for in-process gateway tests.

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{HeaderMap, Request, StatusCode},
    Router,
};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tower::ServiceExt;

use homebase_utils::{AppConfig, HomebaseResult};

use crate::cache::{ManualClock, TtlCache};
use crate::metrics::Metrics;
use crate::upstream::{UpstreamClient, UpstreamRequest, UpstreamResponse};
use crate::{create_app, AppState};

/// Upstream double that replays canned responses and records every request.
#[derive(Default)]
pub struct RecordingUpstream {
    responses: Mutex<VecDeque<HomebaseResult<UpstreamResponse>>>,
    requests: Mutex<Vec<UpstreamRequest>>,
}

impl RecordingUpstream {
    pub fn with_responses(responses: Vec<HomebaseResult<UpstreamResponse>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<UpstreamRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl UpstreamClient for RecordingUpstream {
    async fn send(&self, request: UpstreamRequest) -> HomebaseResult<UpstreamResponse> {
        self.requests.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(UpstreamResponse::json(200, "{}")))
    }
}

/// Config with every upstream credential set.
pub fn configured() -> AppConfig {
    let mut config = AppConfig::default();
    config.upstream.geocoding_token = Some("pk.test".into());
    config.upstream.identity_api_key = Some("persona_test".into());
    config.upstream.identity_template_id = Some("itmpl_default".into());
    config.upstream.storage_token = Some("blob_rw_test".into());
    config.upstream.property_api_key = Some("rc_test".into());
    config
}

pub struct Harness {
    pub app: Router,
    pub upstream: Arc<RecordingUpstream>,
    pub clock: Arc<ManualClock>,
}

pub fn harness(config: AppConfig, responses: Vec<HomebaseResult<UpstreamResponse>>) -> Harness {
    let upstream = Arc::new(RecordingUpstream::with_responses(responses));
    let clock = Arc::new(ManualClock::new());
    let cache = TtlCache::new(
        Duration::from_secs(config.cache.ttl_seconds),
        config.cache.max_entries,
        clock.clone(),
    );

    let state = AppState {
        config: Arc::new(config),
        upstream: upstream.clone(),
        geocode_cache: Arc::new(cache),
        metrics: Arc::new(Metrics::new().unwrap()),
    };

    Harness {
        app: create_app(state),
        upstream,
        clock,
    }
}

pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, HeaderMap, Vec<u8>) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, headers, body.to_vec())
}

pub fn json_body(body: &[u8]) -> serde_json::Value {
    serde_json::from_slice(body).unwrap()
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}
