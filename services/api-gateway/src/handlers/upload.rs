//! File upload proxy to object storage.

use axum::{
    body::Bytes,
    extract::{
        rejection::{BytesRejection, QueryRejection},
        Query, State,
    },
    http::{header, HeaderMap},
    response::Response,
};

use homebase_models::UploadQuery;
use homebase_utils::{
    require_non_blank, validate_file_size, validate_storage_path, HomebaseError, HomebaseResult,
};

use super::require_credential;
use crate::upstream::{forward, json_response, UpstreamMethod, UpstreamRequest};
use crate::AppState;

const SERVICE: &str = "storage";
const STORAGE_API_VERSION: &str = "7";

pub async fn upload_file(
    State(state): State<AppState>,
    query: Result<Query<UploadQuery>, QueryRejection>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> HomebaseResult<Response> {
    let Query(query) = query?;
    let upstream = &state.config.upstream;
    let token = require_credential(&upstream.storage_token, SERVICE)?;

    let filename = require_non_blank(
        "filename",
        query.filename.as_deref(),
        "Missing or invalid filename",
    )?;
    validate_storage_path(filename)?;
    let body = body?;

    if body.is_empty() {
        return Err(HomebaseError::validation("file", "Missing file body"));
    }
    validate_file_size(body.len() as u64, state.config.server.max_request_size as u64)?;

    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("application/octet-stream")
        .to_string();

    let url = format!("{}/{}", upstream.storage_base_url.trim_end_matches('/'), filename);
    let size = body.len();
    let request = UpstreamRequest::new(SERVICE, UpstreamMethod::Put, url)
        .header("Authorization", format!("Bearer {}", token))
        .header("x-api-version", STORAGE_API_VERSION)
        .header("x-content-type", content_type.clone())
        .header("x-add-random-suffix", "1")
        .bytes(content_type, body);

    let response = forward(state.upstream.as_ref(), &state.metrics, request).await?;
    tracing::info!(filename, size, "file uploaded");

    Ok(json_response(response.status, response.body, None, None))
}
