//! Document fetching from object storage or a direct URL.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use reqwest::{header::CONTENT_TYPE, Client};
use std::time::Duration;

use homebase_database::BlobStore;

/// Raw document bytes plus whatever hints came with them.
#[derive(Debug, Clone)]
pub struct FetchedDocument {
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
    /// Storage path or URL, used for suffix-based format hints.
    pub name: String,
}

#[async_trait]
pub trait DocumentSource: Send + Sync {
    fn storage_enabled(&self) -> bool;
    async fn from_storage(&self, path: &str) -> Result<FetchedDocument>;
    async fn from_url(&self, url: &str) -> Result<FetchedDocument>;
}

#[derive(Clone)]
pub struct HttpDocumentSource {
    client: Client,
    blobs: BlobStore,
}

impl HttpDocumentSource {
    pub fn new(blobs: BlobStore, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client, blobs })
    }

    async fn download(&self, url: &str) -> Result<(Vec<u8>, Option<String>)> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .context("Failed to fetch document")?;

        let status = response.status();
        if !status.is_success() {
            bail!("document fetch returned {}", status);
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = response
            .bytes()
            .await
            .context("Failed to read document body")?;

        Ok((bytes.to_vec(), content_type))
    }
}

#[async_trait]
impl DocumentSource for HttpDocumentSource {
    fn storage_enabled(&self) -> bool {
        self.blobs.is_configured()
    }

    async fn from_storage(&self, path: &str) -> Result<FetchedDocument> {
        let blob = self.blobs.resolve(path).await?;
        let (bytes, served_type) = self.download(&blob.url).await?;

        Ok(FetchedDocument {
            bytes,
            content_type: blob.content_type.or(served_type),
            name: blob.pathname,
        })
    }

    async fn from_url(&self, url: &str) -> Result<FetchedDocument> {
        let (bytes, content_type) = self.download(url).await?;

        Ok(FetchedDocument {
            bytes,
            content_type,
            name: url.to_string(),
        })
    }
}
