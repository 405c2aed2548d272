use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{info, warn};

use homebase_database::BlobStore;
use homebase_document_processing::{
    create_app, fetcher::HttpDocumentSource, ocr::TesseractOcr, pdf_processor::PdfProcessor,
    DocumentExtractor,
};
use homebase_utils::{init_logging, AppConfig};

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load().context("Failed to load configuration")?;

    init_logging(&config.logging)?;
    info!("Starting Homebase Document Processing Service");

    let timeout = Duration::from_secs(config.upstream.timeout_seconds);
    let blobs = BlobStore::new(
        config.upstream.storage_base_url.clone(),
        config.upstream.storage_token.clone(),
        timeout,
    )?;
    if !blobs.is_configured() {
        warn!("object storage token not configured; path lookups will return 503");
    }

    let extractor = DocumentExtractor::new(
        Arc::new(HttpDocumentSource::new(blobs, timeout)?),
        Arc::new(PdfProcessor::new()),
        Arc::new(TesseractOcr::from_config(&config.extraction)),
        &config.extraction,
    );

    let app = create_app(extractor, config.server.max_request_size);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.extraction_port)
        .parse()
        .context("Invalid server address")?;
    let listener = TcpListener::bind(&addr).await?;
    info!("Document Processing Service listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
