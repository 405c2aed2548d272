//! Identity-verification inquiry creation proxy.

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    response::Response,
};

use homebase_models::{InquiryEnvelope, InquiryRequest};
use homebase_utils::{configured, validate_model, HomebaseError, HomebaseResult};

use super::require_credential;
use crate::upstream::{forward, json_response, UpstreamMethod, UpstreamRequest};
use crate::AppState;

const SERVICE: &str = "identity";

pub async fn create_inquiry(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> HomebaseResult<Response> {
    let upstream = &state.config.upstream;
    let api_key = require_credential(&upstream.identity_api_key, SERVICE)?;
    let body = body?;

    let request: InquiryRequest = if body.iter().all(u8::is_ascii_whitespace) {
        InquiryRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|_| HomebaseError::validation("body", "Invalid request body"))?
    };
    validate_model(&request)?;

    let template_id = request
        .template_id
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .or_else(|| configured(&upstream.identity_template_id))
        .ok_or_else(|| HomebaseError::validation("templateId", "Missing templateId"))?;

    let envelope = InquiryEnvelope::new(template_id, request.reference_id.clone());
    let url = format!(
        "{}/api/v1/inquiries",
        upstream.identity_base_url.trim_end_matches('/')
    );
    let upstream_request = UpstreamRequest::new(SERVICE, UpstreamMethod::Post, url)
        .header("Authorization", format!("Bearer {}", api_key))
        .header("Persona-Version", upstream.identity_api_version.clone())
        .json(serde_json::to_value(&envelope)?);

    let response = forward(state.upstream.as_ref(), &state.metrics, upstream_request).await?;
    tracing::info!(reference_id = ?request.reference_id, "identity inquiry created");

    Ok(json_response(response.status, response.body, None, None))
}
