//! Property-data lookup proxy.

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    response::Response,
};

use homebase_models::PropertyQuery;
use homebase_utils::{require_non_blank, HomebaseResult};

use super::{cache_control, require_credential};
use crate::upstream::{forward, json_response, UpstreamMethod, UpstreamRequest};
use crate::AppState;

const SERVICE: &str = "property";

pub async fn property_lookup(
    State(state): State<AppState>,
    query: Result<Query<PropertyQuery>, QueryRejection>,
) -> HomebaseResult<Response> {
    let Query(query) = query?;
    let upstream = &state.config.upstream;
    let api_key = require_credential(&upstream.property_api_key, SERVICE)?;
    let address = require_non_blank("address", query.address.as_deref(), "Missing address")?;

    let url = format!("{}/v1/properties", upstream.property_base_url.trim_end_matches('/'));
    let request = UpstreamRequest::new(SERVICE, UpstreamMethod::Get, url)
        .header("X-Api-Key", api_key)
        .query("address", address);

    let response = forward(state.upstream.as_ref(), &state.metrics, request).await?;

    let cache = &state.config.cache;
    Ok(json_response(
        response.status,
        response.body,
        Some(&cache_control(cache.s_maxage_seconds, cache.stale_while_revalidate_seconds)),
        None,
    ))
}
