//! Places autocomplete proxy.

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    response::Response,
};
use uuid::Uuid;

use homebase_models::{AutocompleteRequest, DEFAULT_GEOCODE_LIMIT};
use homebase_utils::{require_non_blank, validate_model, HomebaseError, HomebaseResult};

use super::require_credential;
use crate::upstream::{forward, json_response, UpstreamMethod, UpstreamRequest};
use crate::AppState;

const SERVICE: &str = "places";
const INVALID_INPUT: &str = "Missing or invalid input";

pub async fn places_autocomplete(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> HomebaseResult<Response> {
    let token = require_credential(&state.config.upstream.geocoding_token, SERVICE)?;
    let body = body?;

    // Anything but a JSON object with a string `input` is the same client error.
    let request: AutocompleteRequest = serde_json::from_slice::<serde_json::Value>(&body)
        .ok()
        .filter(|v| v.is_object())
        .and_then(|v| serde_json::from_value(v).ok())
        .ok_or_else(|| HomebaseError::validation("input", INVALID_INPUT))?;

    let input = require_non_blank("input", request.input.as_deref(), INVALID_INPUT)?;
    validate_model(&request)?;

    let session_token = request
        .session_token
        .clone()
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let url = format!(
        "{}/search/searchbox/v1/suggest",
        state.config.upstream.geocoding_base_url.trim_end_matches('/')
    );
    let upstream_request = UpstreamRequest::new(SERVICE, UpstreamMethod::Get, url)
        .query("q", input)
        .query("access_token", token)
        .query("session_token", session_token)
        .query("limit", request.limit.unwrap_or(DEFAULT_GEOCODE_LIMIT).to_string())
        .query("country", request.country.as_deref().unwrap_or("us"))
        .query("types", "address,place,postcode")
        .query("language", "en");

    let response = forward(state.upstream.as_ref(), &state.metrics, upstream_request).await?;

    Ok(json_response(response.status, response.body, None, None))
}

#[cfg(test)]
mod tests {
    use crate::test_support::{configured, harness, json_body, post_json, send};
    use crate::upstream::UpstreamResponse;
    use axum::{body::Body, http::{Request, StatusCode}};
    use serde_json::json;

    #[tokio::test]
    async fn test_empty_input_is_rejected() {
        let h = harness(configured(), vec![]);

        let (status, _, body) =
            send(&h.app, post_json("/api/places/autocomplete", json!({ "input": "" }))).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json_body(&body)["error"], "Missing or invalid input");
        assert!(h.upstream.requests().is_empty());
    }

    #[tokio::test]
    async fn test_non_string_input_and_garbage_bodies_are_rejected() {
        let h = harness(configured(), vec![]);

        for body in [json!({ "input": 42 }), json!(["123 Main"]), json!({})] {
            let (status, _, response) =
                send(&h.app, post_json("/api/places/autocomplete", body)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(json_body(&response)["error"], "Missing or invalid input");
        }

        let request = Request::builder()
            .method("POST")
            .uri("/api/places/autocomplete")
            .body(Body::from("not json"))
            .unwrap();
        let (status, _, _) = send(&h.app, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_valid_input_is_forwarded() {
        let suggestions = r#"{"suggestions":[{"name":"123 Main St"}]}"#;
        let h = harness(configured(), vec![Ok(UpstreamResponse::json(200, suggestions))]);

        let (status, _, body) = send(
            &h.app,
            post_json(
                "/api/places/autocomplete",
                json!({ "input": "123 Main", "sessionToken": "sess-1" }),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, suggestions.as_bytes());

        let requests = h.upstream.requests();
        assert_eq!(requests[0].query_value("q"), Some("123 Main"));
        assert_eq!(requests[0].query_value("session_token"), Some("sess-1"));
        assert_eq!(requests[0].query_value("access_token"), Some("pk.test"));
    }

    #[tokio::test]
    async fn test_oversized_body_is_json_error() {
        let mut config = configured();
        config.server.max_request_size = 64;
        let h = harness(config, vec![]);

        let (status, headers, body) = send(
            &h.app,
            post_json("/api/places/autocomplete", json!({ "input": "x".repeat(256) })),
        )
        .await;

        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(headers["content-type"], "application/json");
        assert_eq!(json_body(&body)["code"], "PAYLOAD_TOO_LARGE");
        assert!(h.upstream.requests().is_empty());
    }

    #[tokio::test]
    async fn test_get_is_not_allowed() {
        let h = harness(configured(), vec![]);
        let request = Request::builder()
            .uri("/api/places/autocomplete")
            .body(Body::empty())
            .unwrap();

        let (status, _, _) = send(&h.app, request).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    }
}
