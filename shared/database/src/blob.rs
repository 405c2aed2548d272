//! Object-storage client
//!
//! Resolves stored pathnames to public URLs and removes blobs. Uploads go
//! through the gateway's upload proxy instead.

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use homebase_models::{BlobListing, BlobObject};

#[async_trait]
pub trait BlobDeleter: Send + Sync {
    async fn delete(&self, url: &str) -> Result<()>;
}

#[derive(Clone)]
pub struct BlobStore {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl BlobStore {
    pub fn new(base_url: impl Into<String>, token: Option<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self::with_client(client, base_url, token))
    }

    pub fn with_client(client: Client, base_url: impl Into<String>, token: Option<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.filter(|t| !t.trim().is_empty()),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.token.is_some()
    }

    fn token(&self) -> Result<&str> {
        self.token
            .as_deref()
            .ok_or_else(|| anyhow!("object storage token is not configured"))
    }

    /// Looks up the blob stored under `pathname`.
    pub async fn resolve(&self, pathname: &str) -> Result<BlobObject> {
        let pathname = pathname.trim_start_matches('/');
        let url = format!(
            "{}/?prefix={}&limit=1",
            self.base_url,
            urlencoding::encode(pathname)
        );

        let response = self
            .client
            .get(&url)
            .bearer_auth(self.token()?)
            .send()
            .await
            .context("Failed to query object storage")?;

        if !response.status().is_success() {
            bail!("object storage lookup returned {}", response.status());
        }

        let listing: BlobListing = response
            .json()
            .await
            .context("Failed to parse object storage listing")?;

        listing
            .blobs
            .into_iter()
            .find(|b| b.pathname == pathname)
            .ok_or_else(|| anyhow!("no blob stored at {}", pathname))
    }
}

#[async_trait]
impl BlobDeleter for BlobStore {
    async fn delete(&self, url: &str) -> Result<()> {
        let response = self
            .client
            .post(format!("{}/delete", self.base_url))
            .bearer_auth(self.token()?)
            .json(&serde_json::json!({ "urls": [url] }))
            .send()
            .await
            .with_context(|| format!("Failed to delete blob {}", url))?;

        if !response.status().is_success() {
            bail!("object storage delete of {} returned {}", url, response.status());
        }

        Ok(())
    }
}
