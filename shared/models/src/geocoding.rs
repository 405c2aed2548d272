//! Geocoding and places request models.

use serde::{Deserialize, Serialize};
use validator::Validate;

pub const DEFAULT_GEOCODE_LIMIT: u32 = 5;
pub const MAX_GEOCODE_LIMIT: u32 = 10;

/// Query string accepted by the geocoding proxy. `limit` is kept as text so a
/// malformed value falls back to the default instead of rejecting the request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeocodeQuery {
    pub q: Option<String>,
    pub limit: Option<String>,
    pub country: Option<String>,
    pub types: Option<String>,
    pub proximity: Option<String>,
}

impl GeocodeQuery {
    pub fn effective_limit(&self) -> u32 {
        self.limit
            .as_deref()
            .and_then(|l| l.trim().parse::<i64>().ok())
            .map(|l| l.clamp(1, MAX_GEOCODE_LIMIT as i64) as u32)
            .unwrap_or(DEFAULT_GEOCODE_LIMIT)
    }

    /// Composite cache key over the normalized parameters.
    pub fn cache_key(&self) -> String {
        fn norm(value: &Option<String>) -> String {
            value
                .as_deref()
                .map(|v| v.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase())
                .unwrap_or_default()
        }

        format!(
            "q={}|limit={}|country={}|types={}|proximity={}",
            norm(&self.q),
            self.effective_limit(),
            norm(&self.country),
            norm(&self.types),
            norm(&self.proximity),
        )
    }
}

/// Body of a places autocomplete request.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AutocompleteRequest {
    pub input: Option<String>,
    #[validate(length(min = 1, max = 128, message = "Invalid session token"))]
    pub session_token: Option<String>,
    #[validate(range(min = 1, max = 10, message = "Limit must be between 1 and 10"))]
    pub limit: Option<u32>,
    #[validate(length(min = 2, max = 64, message = "Invalid country filter"))]
    pub country: Option<String>,
}
