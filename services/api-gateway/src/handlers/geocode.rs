//! Forward geocoding proxy with a process-local response cache.

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    response::Response,
};

use homebase_models::GeocodeQuery;
use homebase_utils::{require_non_blank, HomebaseResult};

use super::{cache_control, require_credential};
use crate::upstream::{forward, json_response, UpstreamMethod, UpstreamRequest};
use crate::AppState;

const SERVICE: &str = "geocoding";

pub async fn geocode(
    State(state): State<AppState>,
    query: Result<Query<GeocodeQuery>, QueryRejection>,
) -> HomebaseResult<Response> {
    let Query(query) = query?;
    let token = require_credential(&state.config.upstream.geocoding_token, SERVICE)?;
    let q = require_non_blank("q", query.q.as_deref(), "Missing query parameter q")?;

    let cache = &state.config.cache;
    let cache_control = cache_control(cache.s_maxage_seconds, cache.stale_while_revalidate_seconds);

    let key = query.cache_key();
    if let Some(body) = state.geocode_cache.get(&key) {
        state.metrics.record_cache(true);
        tracing::debug!(key = %key, "geocode cache hit");
        return Ok(json_response(200, body, Some(&cache_control), Some("HIT")));
    }
    state.metrics.record_cache(false);

    let url = format!(
        "{}/geocoding/v5/mapbox.places/{}.json",
        state.config.upstream.geocoding_base_url.trim_end_matches('/'),
        urlencoding::encode(q)
    );
    let request = UpstreamRequest::new(SERVICE, UpstreamMethod::Get, url)
        .query("access_token", token)
        .query("limit", query.effective_limit().to_string())
        .query("autocomplete", "true")
        .query_opt("country", query.country.as_deref())
        .query_opt("types", query.types.as_deref())
        .query_opt("proximity", query.proximity.as_deref());

    let response = forward(state.upstream.as_ref(), &state.metrics, request).await?;
    state.geocode_cache.insert(key, response.body.clone());

    Ok(json_response(
        response.status,
        response.body,
        Some(&cache_control),
        Some("MISS"),
    ))
}
