//! PDF Processor
//!
//! Pulls the text layer out of PDF documents. Scanned PDFs without a text
//! layer come back empty rather than failing.

use anyhow::{Context, Result};
use async_trait::async_trait;

use crate::extraction::TextExtractor;

/// PDF processor
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfProcessor;

impl PdfProcessor {
    pub fn new() -> Self {
        Self
    }

    /// Extract text from PDF bytes on the calling thread.
    pub fn extract_blocking(data: &[u8]) -> Result<String> {
        pdf_extract::extract_text_from_mem(data).context("Failed to extract text from PDF")
    }
}

#[async_trait]
impl TextExtractor for PdfProcessor {
    async fn extract_text(&self, data: &[u8]) -> Result<String> {
        let data = data.to_vec();
        // Parsing is CPU bound and the parser can panic on malformed input;
        // a panic surfaces here as a join error.
        tokio::task::spawn_blocking(move || Self::extract_blocking(&data))
            .await
            .context("PDF extraction task failed")?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_malformed_pdf_is_an_error() {
        let processor = PdfProcessor::new();
        let result = processor.extract_text(b"%PDF-1.4\nthis is not a real pdf").await;
        assert!(result.is_err());
    }
}
