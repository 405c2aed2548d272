//! Homebase API Gateway
//!
//! Thin proxy endpoints in front of third-party geocoding, places,
//! identity-verification, object-storage and property-data APIs.

use axum::{body::Bytes, extract::DefaultBodyLimit, routing::get, Router};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{compression::CompressionLayer, trace::TraceLayer};

use homebase_utils::{cors_middleware, request_id_middleware, AppConfig};

pub mod cache;
pub mod handlers;
pub mod metrics;
pub mod routes;
pub mod upstream;

#[cfg(test)]
pub(crate) mod test_support;

use cache::TtlCache;
use metrics::Metrics;
use upstream::UpstreamClient;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub upstream: Arc<dyn UpstreamClient>,
    pub geocode_cache: Arc<TtlCache<Bytes>>,
    pub metrics: Arc<Metrics>,
}

pub fn create_app(state: AppState) -> Router {
    let max_request_size = state.config.server.max_request_size;

    Router::new()
        // Health check endpoint
        .route("/health", get(handlers::health_check))
        .route("/metrics", get(handlers::metrics_handler))

        // API routes
        .nest("/api", routes::create_api_routes())

        // Middleware stack
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(DefaultBodyLimit::max(max_request_size))
                .layer(axum::middleware::from_fn(request_id_middleware))
                .layer(axum::middleware::from_fn(cors_middleware)),
        )

        // Application state
        .with_state(state)
}
