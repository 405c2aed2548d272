use axum::{extract::State, http::Method, response::Json};
use serde_json::json;

use homebase_utils::HomebaseError;

use crate::AppState;

pub async fn health_check() -> Json<serde_json::Value> {
    Json(json!({
        "status": "healthy",
        "service": "homebase-api-gateway",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION")
    }))
}

pub async fn metrics_handler(State(state): State<AppState>) -> String {
    state.metrics.render()
}

/// Fallback for routes hit with a method they do not serve.
pub async fn method_not_allowed(method: Method) -> HomebaseError {
    HomebaseError::method_not_allowed(method.as_str())
}

#[cfg(test)]
mod tests {
    use crate::test_support::{configured, get, harness, json_body, send};
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };

    #[tokio::test]
    async fn test_health_reports_service() {
        let h = harness(configured(), vec![]);
        let (status, headers, body) = send(&h.app, get("/health")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json_body(&body)["status"], "healthy");
        assert_eq!(headers["access-control-allow-origin"], "*");
        assert!(headers.contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn test_preflight_never_reaches_upstream() {
        let h = harness(configured(), vec![]);
        let request = Request::builder()
            .method("OPTIONS")
            .uri("/api/places/autocomplete")
            .header("origin", "https://app.example.com")
            .header("access-control-request-method", "POST")
            .body(Body::empty())
            .unwrap();

        let (status, headers, body) = send(&h.app, request).await;

        assert_eq!(status, StatusCode::NO_CONTENT);
        assert_eq!(headers["access-control-allow-origin"], "*");
        assert!(body.is_empty());
        assert!(h.upstream.requests().is_empty());
    }
}
