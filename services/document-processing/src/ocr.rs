//! OCR through the `tesseract` command line.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use std::io::Write;
use tokio::process::Command;

use homebase_utils::ExtractionConfig;

use crate::extraction::TextExtractor;

#[derive(Debug, Clone)]
pub struct TesseractOcr {
    command: String,
    language: String,
}

impl TesseractOcr {
    pub fn new(command: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            language: language.into(),
        }
    }

    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self::new(config.ocr_command.clone(), config.ocr_language.clone())
    }
}

#[async_trait]
impl TextExtractor for TesseractOcr {
    async fn extract_text(&self, data: &[u8]) -> Result<String> {
        // tesseract reads from a path; the file is removed when dropped.
        let mut image = tempfile::NamedTempFile::new().context("Failed to create temp file")?;
        image.write_all(data).context("Failed to write image to temp file")?;
        image.flush()?;

        let output = Command::new(&self.command)
            .arg(image.path())
            .arg("stdout")
            .arg("-l")
            .arg(&self.language)
            .kill_on_drop(true)
            .output()
            .await
            .with_context(|| format!("Failed to run {}", self.command))?;

        if !output.status.success() {
            bail!(
                "{} exited with {}: {}",
                self.command,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
