//! Prometheus metrics for the proxy pipeline.

use prometheus::{Encoder, IntCounterVec, Opts, Registry, TextEncoder};

pub struct Metrics {
    registry: Registry,
    upstream_requests: IntCounterVec,
    cache_lookups: IntCounterVec,
}

impl Metrics {
    pub fn new() -> prometheus::Result<Self> {
        let registry = Registry::new_custom(Some("homebase".to_string()), None)?;

        let upstream_requests = IntCounterVec::new(
            Opts::new("upstream_requests_total", "Upstream calls by service and outcome"),
            &["service", "outcome"],
        )?;
        let cache_lookups = IntCounterVec::new(
            Opts::new("cache_lookups_total", "Response cache lookups by result"),
            &["result"],
        )?;

        registry.register(Box::new(upstream_requests.clone()))?;
        registry.register(Box::new(cache_lookups.clone()))?;

        Ok(Self {
            registry,
            upstream_requests,
            cache_lookups,
        })
    }

    pub fn record_upstream(&self, service: &str, outcome: &str) {
        self.upstream_requests
            .with_label_values(&[service, outcome])
            .inc();
    }

    pub fn record_cache(&self, hit: bool) {
        self.cache_lookups
            .with_label_values(&[if hit { "hit" } else { "miss" }])
            .inc();
    }

    pub fn upstream_count(&self, service: &str, outcome: &str) -> u64 {
        self.upstream_requests
            .with_label_values(&[service, outcome])
            .get()
    }

    pub fn render(&self) -> String {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();

        if let Err(e) = encoder.encode(&self.registry.gather(), &mut buffer) {
            tracing::error!(error = %e, "failed to encode metrics");
            return "Error encoding metrics".to_string();
        }

        String::from_utf8(buffer).unwrap_or_else(|_| "Error encoding metrics".to_string())
    }
}
