//! Document Extraction Service
//!
//! Orchestrates fetch, format detection, text extraction and field
//! heuristics for a single request.

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;

use homebase_models::{ExtractionRequest, ExtractionResult};
use homebase_utils::{validate_model, ExtractionConfig, HomebaseError, HomebaseResult};

use crate::fetcher::{DocumentSource, FetchedDocument};
use crate::format::{classify, DocumentFormat};
use crate::heuristics::{extract_dob, extract_name, normalize_whitespace, AmountExtractor};

#[async_trait]
pub trait TextExtractor: Send + Sync {
    async fn extract_text(&self, data: &[u8]) -> Result<String>;
}

/// Document extractor service
#[derive(Clone)]
pub struct DocumentExtractor {
    source: Arc<dyn DocumentSource>,
    pdf: Arc<dyn TextExtractor>,
    ocr: Arc<dyn TextExtractor>,
    amounts: Arc<AmountExtractor>,
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl DocumentExtractor {
    pub fn new(
        source: Arc<dyn DocumentSource>,
        pdf: Arc<dyn TextExtractor>,
        ocr: Arc<dyn TextExtractor>,
        config: &ExtractionConfig,
    ) -> Self {
        Self {
            source,
            pdf,
            ocr,
            amounts: Arc::new(AmountExtractor::standard(config)),
        }
    }

    /// Extract amount, and for identity documents name and date of birth.
    pub async fn extract(&self, request: &ExtractionRequest) -> HomebaseResult<ExtractionResult> {
        validate_model(request)?;

        let url = non_blank(&request.url);
        let path = non_blank(&request.path);
        if url.is_none() && path.is_none() {
            return Err(HomebaseError::validation("url", "Either url or path is required"));
        }
        if let Some(url) = url {
            if !(url.starts_with("https://") || url.starts_with("http://")) {
                return Err(HomebaseError::validation("url", "Invalid url"));
            }
        }

        let document = self.fetch(path, url).await?;
        let format = classify(document.content_type.as_deref(), &document.name, &document.bytes);
        tracing::info!(
            name = %document.name,
            size = document.bytes.len(),
            format = ?format,
            "document fetched"
        );

        let raw = self.text_for(format, &document.bytes).await?;
        let text = normalize_whitespace(&raw);

        let mut result = ExtractionResult {
            amount: self.amounts.extract(&text),
            ..ExtractionResult::default()
        };
        if request.wants_identity_fields() {
            result.extracted_name = extract_name(&text);
            result.extracted_dob = extract_dob(&text);
        }

        tracing::info!(
            amount_found = result.amount.is_some(),
            name_found = result.extracted_name.is_some(),
            dob_found = result.extracted_dob.is_some(),
            "document extracted"
        );
        Ok(result)
    }

    /// Storage lookup first, then the direct URL.
    async fn fetch(&self, path: Option<&str>, url: Option<&str>) -> HomebaseResult<FetchedDocument> {
        if let Some(path) = path {
            if self.source.storage_enabled() {
                match self.source.from_storage(path).await {
                    Ok(document) => return Ok(document),
                    Err(e) if url.is_some() => {
                        tracing::warn!(path, error = %format!("{:#}", e), "storage lookup failed, using url");
                    }
                    Err(e) => {
                        return Err(HomebaseError::internal(format!("storage fetch failed: {:#}", e)))
                    }
                }
            } else if url.is_none() {
                return Err(HomebaseError::unavailable("Document storage is not configured"));
            }
        }

        // Reaching here without a URL means the path branch already returned.
        let url = url.ok_or_else(|| HomebaseError::validation("url", "Either url or path is required"))?;
        self.source
            .from_url(url)
            .await
            .map_err(|e| HomebaseError::internal(format!("document fetch failed: {:#}", e)))
    }

    async fn text_for(&self, format: DocumentFormat, bytes: &[u8]) -> HomebaseResult<String> {
        match format {
            DocumentFormat::Pdf => self
                .pdf
                .extract_text(bytes)
                .await
                .map_err(|e| HomebaseError::internal(format!("pdf extraction failed: {:#}", e))),
            DocumentFormat::Image | DocumentFormat::Unknown => {
                match self.ocr.extract_text(bytes).await {
                    Ok(text) => Ok(text),
                    Err(e) => {
                        tracing::warn!(error = %format!("{:#}", e), "ocr failed, continuing without text");
                        Ok(String::new())
                    }
                }
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use anyhow::anyhow;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct StubSource {
        pub storage: bool,
        pub documents: HashMap<String, FetchedDocument>,
        pub calls: Mutex<Vec<String>>,
    }

    impl StubSource {
        pub fn with(mut self, key: &str, bytes: &[u8], content_type: Option<&str>) -> Self {
            self.documents.insert(
                key.to_string(),
                FetchedDocument {
                    bytes: bytes.to_vec(),
                    content_type: content_type.map(str::to_string),
                    name: key.to_string(),
                },
            );
            self
        }

        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        fn lookup(&self, key: &str) -> Result<FetchedDocument> {
            self.calls.lock().unwrap().push(key.to_string());
            self.documents
                .get(key)
                .cloned()
                .ok_or_else(|| anyhow!("404 for {}", key))
        }
    }

    #[async_trait]
    impl DocumentSource for StubSource {
        fn storage_enabled(&self) -> bool {
            self.storage
        }

        async fn from_storage(&self, path: &str) -> Result<FetchedDocument> {
            self.lookup(path)
        }

        async fn from_url(&self, url: &str) -> Result<FetchedDocument> {
            self.lookup(url)
        }
    }

    /// Returns fixed text, or fails when `text` is `None`.
    pub struct StubText {
        pub text: Option<String>,
        pub calls: Mutex<usize>,
    }

    impl StubText {
        pub fn ok(text: &str) -> Arc<Self> {
            Arc::new(Self {
                text: Some(text.to_string()),
                calls: Mutex::new(0),
            })
        }

        pub fn failing() -> Arc<Self> {
            Arc::new(Self {
                text: None,
                calls: Mutex::new(0),
            })
        }

        pub fn calls(&self) -> usize {
            *self.calls.lock().unwrap()
        }
    }

    #[async_trait]
    impl TextExtractor for StubText {
        async fn extract_text(&self, _data: &[u8]) -> Result<String> {
            *self.calls.lock().unwrap() += 1;
            self.text.clone().ok_or_else(|| anyhow!("extractor failed"))
        }
    }

    pub fn extractor(
        source: StubSource,
        pdf: Arc<StubText>,
        ocr: Arc<StubText>,
    ) -> DocumentExtractor {
        DocumentExtractor::new(Arc::new(source), pdf, ocr, &ExtractionConfig::default())
    }
}
