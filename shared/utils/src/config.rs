use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub upstream: UpstreamConfig,
    pub cache: CacheConfig,
    pub extraction: ExtractionConfig,
    pub admin: AdminConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub extraction_port: u16,
    pub max_request_size: usize,
}

/// Third-party endpoints and the credentials they need. A missing credential
/// disables only the endpoint that depends on it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    pub timeout_seconds: u64,
    pub geocoding_base_url: String,
    pub geocoding_token: Option<String>,
    pub identity_base_url: String,
    pub identity_api_key: Option<String>,
    pub identity_template_id: Option<String>,
    pub identity_api_version: String,
    pub storage_base_url: String,
    pub storage_token: Option<String>,
    pub property_base_url: String,
    pub property_api_key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub ttl_seconds: u64,
    pub max_entries: usize,
    pub s_maxage_seconds: u64,
    pub stale_while_revalidate_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    pub ocr_command: String,
    pub ocr_language: String,
    pub keyword_window: usize,
    pub min_amount: u64,
    pub max_amount: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    pub database_url: Option<String>,
    pub credentials_path: String,
    pub page_size: i64,
    pub batch_size: usize,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
    pub file_path: Option<String>,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        let config = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(
                File::with_name(&format!(
                    "config/{}",
                    env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into())
                ))
                .required(false),
            )
            // Add local config (gitignored)
            .add_source(File::with_name("config/local").required(false))
            .add_source(Environment::with_prefix("HOMEBASE").separator("__"));

        let mut loaded: AppConfig = config.build()?.try_deserialize()?;

        // Admin tooling reads the conventional connection string from .env.
        if loaded.admin.database_url.is_none() {
            loaded.admin.database_url = env::var("DATABASE_URL").ok();
        }

        Ok(loaded)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            upstream: UpstreamConfig::default(),
            cache: CacheConfig::default(),
            extraction: ExtractionConfig::default(),
            admin: AdminConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            extraction_port: 8083,
            max_request_size: 16 * 1024 * 1024, // 16MB
        }
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 30,
            geocoding_base_url: "https://api.mapbox.com".to_string(),
            geocoding_token: None,
            identity_base_url: "https://withpersona.com".to_string(),
            identity_api_key: None,
            identity_template_id: None,
            identity_api_version: "2023-01-05".to_string(),
            storage_base_url: "https://blob.vercel-storage.com".to_string(),
            storage_token: None,
            property_base_url: "https://api.rentcast.io".to_string(),
            property_api_key: None,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: 600,
            max_entries: 10_000,
            s_maxage_seconds: 300,
            stale_while_revalidate_seconds: 600,
        }
    }
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            ocr_command: "tesseract".to_string(),
            ocr_language: "eng".to_string(),
            keyword_window: 200,
            min_amount: 1_000,
            max_amount: 100_000_000,
        }
    }
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            credentials_path: "service-account.json".to_string(),
            page_size: 500,
            batch_size: 400,
            max_connections: 5,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "json".to_string(),
            file_path: None,
        }
    }
}

/// Returns the configured secret, treating blank values as absent.
pub fn configured(secret: &Option<String>) -> Option<&str> {
    secret.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_env_override_keeps_section_defaults() {
        env::set_var("HOMEBASE__UPSTREAM__GEOCODING_TOKEN", "pk.live");
        env::set_var("HOMEBASE__CACHE__TTL_SECONDS", "120");
        let loaded = AppConfig::load();
        env::remove_var("HOMEBASE__UPSTREAM__GEOCODING_TOKEN");
        env::remove_var("HOMEBASE__CACHE__TTL_SECONDS");

        let config = loaded.unwrap();
        assert_eq!(config.upstream.geocoding_token.as_deref(), Some("pk.live"));
        assert_eq!(config.upstream.timeout_seconds, 30);
        assert_eq!(config.upstream.geocoding_base_url, "https://api.mapbox.com");
        assert_eq!(config.cache.ttl_seconds, 120);
        assert_eq!(config.cache.max_entries, 10_000);
    }
}
