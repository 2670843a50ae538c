use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use uuid::Uuid;

/// Unified API error type.
///
/// Every failure in the scan pipeline is caught and converted into one of
/// these variants at the handler boundary; no error escapes as an unhandled
/// fault. Error bodies are flat `{"error": ..., "image": ...}` JSON so
/// clients can always parse the response regardless of outcome.
///
/// Internal error text is returned verbatim to the caller. Redacting it for
/// untrusted clients is a deployment concern left to a fronting gateway.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The scan subprocess exceeded its wall-clock budget.
    #[error("Scan timed out after {timeout_secs}s. Try a smaller image or increase the scan timeout.")]
    ScanTimeout { image: String, timeout_secs: u64 },

    /// The scanner exited non-zero without producing any usable output.
    #[error("Trivy scan failed: {stderr}")]
    ScanFailed { image: String, stderr: String },

    /// The scanner produced output that is not well-formed JSON.
    #[error("Failed to parse scanner output: {source}")]
    ParseFailed {
        image: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Create a new validation error
    pub fn validation<T: Into<String>>(msg: T) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a new internal error
    pub fn internal<T: Into<String>>(msg: T) -> Self {
        Self::Internal(msg.into())
    }

    /// The image reference the failed request was about, where known.
    pub fn image(&self) -> Option<&str> {
        match self {
            ApiError::ScanTimeout { image, .. }
            | ApiError::ScanFailed { image, .. }
            | ApiError::ParseFailed { image, .. } => Some(image),
            _ => None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let error_id = Uuid::new_v4();
        let message = self.to_string();
        let image = self.image().map(str::to_owned);

        let (status, error_code) = match &self {
            ApiError::ScanTimeout { image, timeout_secs } => {
                tracing::warn!(
                    error_id = %error_id,
                    image = %image,
                    timeout_secs = timeout_secs,
                    "scan timed out"
                );
                (StatusCode::GATEWAY_TIMEOUT, "SCAN_TIMEOUT")
            }
            ApiError::ScanFailed { image, stderr } => {
                tracing::error!(
                    error_id = %error_id,
                    image = %image,
                    stderr = %stderr,
                    "scan failed"
                );
                (StatusCode::INTERNAL_SERVER_ERROR, "SCAN_FAILED")
            }
            ApiError::ParseFailed { image, source } => {
                tracing::error!(
                    error_id = %error_id,
                    image = %image,
                    error = %source,
                    "failed to parse scanner output"
                );
                (StatusCode::INTERNAL_SERVER_ERROR, "PARSE_FAILED")
            }
            ApiError::Validation(msg) => {
                tracing::warn!(
                    error_id = %error_id,
                    error = %msg,
                    "validation error occurred"
                );
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR")
            }
            ApiError::Config(err) => {
                tracing::error!(
                    error_id = %error_id,
                    error = %err,
                    "configuration error occurred"
                );
                (StatusCode::INTERNAL_SERVER_ERROR, "CONFIG_ERROR")
            }
            ApiError::Io(err) => {
                tracing::error!(
                    error_id = %error_id,
                    error = %err,
                    "IO error occurred"
                );
                (StatusCode::INTERNAL_SERVER_ERROR, "IO_ERROR")
            }
            ApiError::Serialization(err) => {
                tracing::error!(
                    error_id = %error_id,
                    error = %err,
                    "serialization error occurred"
                );
                (StatusCode::INTERNAL_SERVER_ERROR, "SERIALIZATION_ERROR")
            }
            ApiError::Internal(msg) => {
                tracing::error!(
                    error_id = %error_id,
                    error = %msg,
                    "internal server error occurred"
                );
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
        };

        let mut body = json!({ "error": message, "code": error_code });
        if let Some(image) = image {
            body["image"] = json!(image);
        }

        (status, Json(body)).into_response()
    }
}

/// Result type alias for API operations
pub type ApiResult<T> = Result<T, ApiError>;
