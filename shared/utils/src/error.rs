use axum::{
    extract::rejection::{BytesRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum HomebaseError {
    #[error("Validation error: {field} - {message}")]
    Validation { field: String, message: String },

    #[error("Method not allowed: {method}")]
    MethodNotAllowed { method: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Service unavailable: {message}")]
    Unavailable { message: String },

    #[error("Upstream authentication failed: {service}")]
    UpstreamAuth {
        service: String,
        details: Option<serde_json::Value>,
    },

    #[error("Upstream error: {service} returned {status}")]
    Upstream {
        service: String,
        status: u16,
        details: Option<serde_json::Value>,
    },

    #[error("Upstream unreachable: {service} - {message}")]
    UpstreamUnreachable { service: String, message: String },

    #[error("Payload too large: {message}")]
    PayloadTooLarge { message: String },

    #[error("Database error: {message}")]
    Database { message: String },

    #[error("Internal server error: {message}")]
    Internal { message: String },
}

impl HomebaseError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn method_not_allowed(method: impl Into<String>) -> Self {
        Self::MethodNotAllowed {
            method: method.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    pub fn upstream_unreachable(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self::UpstreamUnreachable {
            service: service.into(),
            message: message.into(),
        }
    }

    pub fn payload_too_large(message: impl Into<String>) -> Self {
        Self::PayloadTooLarge {
            message: message.into(),
        }
    }

    pub fn database(message: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "VALIDATION_ERROR",
            Self::MethodNotAllowed { .. } => "METHOD_NOT_ALLOWED",
            Self::Configuration { .. } => "CONFIGURATION_ERROR",
            Self::Unavailable { .. } => "SERVICE_UNAVAILABLE",
            Self::UpstreamAuth { .. } => "UPSTREAM_AUTH_ERROR",
            Self::Upstream { .. } => "UPSTREAM_ERROR",
            Self::UpstreamUnreachable { .. } => "UPSTREAM_UNREACHABLE",
            Self::PayloadTooLarge { .. } => "PAYLOAD_TOO_LARGE",
            Self::Database { .. } => "DATABASE_ERROR",
            Self::Internal { .. } => "INTERNAL_SERVER_ERROR",
        }
    }

    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::Validation { .. } => 400,
            Self::MethodNotAllowed { .. } => 405,
            Self::Configuration { .. } => 500,
            Self::Unavailable { .. } => 503,
            Self::UpstreamAuth { .. } => 401,
            Self::Upstream { .. } => 502,
            Self::UpstreamUnreachable { .. } => 502,
            Self::PayloadTooLarge { .. } => 413,
            Self::Database { .. } => 500,
            Self::Internal { .. } => 500,
        }
    }

    /// Message shown to the caller. Configuration and internal details stay
    /// in the server logs.
    pub fn public_message(&self) -> String {
        match self {
            Self::Validation { message, .. } => message.clone(),
            Self::MethodNotAllowed { .. } => "Method not allowed".to_string(),
            Self::Configuration { .. } => "Service is not configured".to_string(),
            Self::Unavailable { message } => message.clone(),
            Self::UpstreamAuth { .. } => "Upstream authentication failed".to_string(),
            Self::Upstream { .. } => "Upstream request failed".to_string(),
            Self::UpstreamUnreachable { .. } => "Upstream service unreachable".to_string(),
            Self::PayloadTooLarge { .. } => "Request body too large".to_string(),
            Self::Database { .. } | Self::Internal { .. } => "Internal server error".to_string(),
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            Self::UpstreamAuth { details, .. } | Self::Upstream { details, .. } => details.clone(),
            _ => None,
        }
    }
}

pub type HomebaseResult<T> = Result<T, HomebaseError>;

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl From<&HomebaseError> for ErrorResponse {
    fn from(error: &HomebaseError) -> Self {
        Self {
            error: error.public_message(),
            code: error.error_code().to_string(),
            details: error.details(),
        }
    }
}

impl IntoResponse for HomebaseError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status.is_server_error() {
            tracing::error!(error = %self, code = self.error_code(), "request failed");
        } else {
            tracing::warn!(error = %self, code = self.error_code(), "request rejected");
        }

        (status, Json(ErrorResponse::from(&self))).into_response()
    }
}

// Conversion from common error types
impl From<sqlx::Error> for HomebaseError {
    fn from(error: sqlx::Error) -> Self {
        Self::database(error.to_string())
    }
}

impl From<reqwest::Error> for HomebaseError {
    fn from(error: reqwest::Error) -> Self {
        Self::upstream_unreachable("HTTP Client", error.to_string())
    }
}

impl From<serde_json::Error> for HomebaseError {
    fn from(error: serde_json::Error) -> Self {
        Self::validation("JSON", error.to_string())
    }
}

impl From<anyhow::Error> for HomebaseError {
    fn from(error: anyhow::Error) -> Self {
        Self::internal(format!("{:#}", error))
    }
}

// Extractor rejections would otherwise reach the caller as plain text.
impl From<QueryRejection> for HomebaseError {
    fn from(rejection: QueryRejection) -> Self {
        Self::validation("query", rejection.body_text())
    }
}

impl From<BytesRejection> for HomebaseError {
    fn from(rejection: BytesRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            Self::payload_too_large(rejection.body_text())
        } else {
            Self::validation("body", "Invalid request body")
        }
    }
}
