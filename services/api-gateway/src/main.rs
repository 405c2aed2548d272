use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{info, warn};

use homebase_api_gateway::{
    cache::{SystemClock, TtlCache},
    create_app,
    metrics::Metrics,
    upstream::HttpUpstream,
    AppState,
};
use homebase_utils::{configured, init_logging, AppConfig};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = AppConfig::load().context("Failed to load configuration")?;

    // Initialize logging
    init_logging(&config.logging)?;
    info!("Starting Homebase API Gateway");

    let upstream = &config.upstream;
    for (name, secret) in [
        ("geocoding", &upstream.geocoding_token),
        ("identity", &upstream.identity_api_key),
        ("storage", &upstream.storage_token),
        ("property", &upstream.property_api_key),
    ] {
        if configured(secret).is_none() {
            warn!(service = name, "credential not configured; endpoint will return 500");
        }
    }

    let client = HttpUpstream::new(Duration::from_secs(upstream.timeout_seconds))?;
    let cache = TtlCache::new(
        Duration::from_secs(config.cache.ttl_seconds),
        config.cache.max_entries,
        Arc::new(SystemClock),
    );
    let metrics = Metrics::new().context("Failed to register metrics")?;

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address")?;

    let app = create_app(AppState {
        config: Arc::new(config),
        upstream: Arc::new(client),
        geocode_cache: Arc::new(cache),
        metrics: Arc::new(metrics),
    });

    // Start server
    let listener = TcpListener::bind(&addr).await?;
    info!("API Gateway listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
