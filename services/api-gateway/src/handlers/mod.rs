pub mod geocode;
pub mod health;
pub mod identity;
pub mod places;
pub mod property;
pub mod upload;

pub use geocode::*;
pub use health::*;
pub use identity::*;
pub use places::*;
pub use property::*;
pub use upload::*;

use homebase_utils::{configured, HomebaseError, HomebaseResult};

/// Credential gate: a missing secret is a server configuration error and
/// the request never reaches the upstream.
pub(crate) fn require_credential<'a>(
    secret: &'a Option<String>,
    service: &str,
) -> HomebaseResult<&'a str> {
    configured(secret).ok_or_else(|| {
        HomebaseError::configuration(format!("{} credential is not configured", service))
    })
}

pub(crate) fn cache_control(s_maxage: u64, stale_while_revalidate: u64) -> String {
    format!(
        "public, s-maxage={}, stale-while-revalidate={}",
        s_maxage, stale_while_revalidate
    )
}
