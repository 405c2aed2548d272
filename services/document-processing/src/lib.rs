//! Homebase Document Processing Service
//!
//! Pulls a pre-approval amount, and for identity documents a name and date
//! of birth, out of uploaded PDFs and images.

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, DefaultBodyLimit, State},
    http::Method,
    response::Json,
    routing::{get, post},
    Router,
};
use serde_json::json;
use tower_http::trace::TraceLayer;

use homebase_models::{ExtractionRequest, ExtractionResult};
use homebase_utils::{cors_middleware, request_id_middleware, HomebaseError, HomebaseResult};

pub mod extraction;
pub mod fetcher;
pub mod format;
pub mod heuristics;
pub mod ocr;
pub mod pdf_processor;

pub use extraction::{DocumentExtractor, TextExtractor};

pub fn create_app(extractor: DocumentExtractor, max_request_size: usize) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route(
            "/api/documents/extract",
            post(extract_document).fallback(method_not_allowed),
        )
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(max_request_size))
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(axum::middleware::from_fn(cors_middleware))
        .with_state(extractor)
}

async fn health_check() -> Json<serde_json::Value> {
    Json(json!({
        "status": "healthy",
        "service": "homebase-document-processing",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

async fn method_not_allowed(method: Method) -> HomebaseError {
    HomebaseError::method_not_allowed(method.to_string())
}

/// Extract fields from a stored or linked document
async fn extract_document(
    State(extractor): State<DocumentExtractor>,
    body: Result<Bytes, BytesRejection>,
) -> HomebaseResult<Json<ExtractionResult>> {
    let body = body?;
    let request: ExtractionRequest = if body.iter().all(u8::is_ascii_whitespace) {
        ExtractionRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|_| HomebaseError::validation("body", "Invalid request body"))?
    };

    let result = extractor.extract(&request).await?;
    Ok(Json(result))
}
