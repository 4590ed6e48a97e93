use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use std::time::Duration;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::generation::validation::ValidationError;
use crate::models::ErrorKind;
use crate::render::RenderError;

/// Error payload returned to clients: a stable category, a readable detail, and the
/// time the error was produced. Never carries stack traces or credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub detail: String,
    pub timestamp: DateTime<Utc>,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            detail: detail.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Invalid request body: {0}")]
    InvalidBody(#[from] JsonRejection),

    #[error("Generation failed ({kind:?}): {message}")]
    Generation { kind: ErrorKind, message: String },

    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    #[error("Request exceeded {}s", .0.as_secs())]
    RequestTimeout(Duration),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn category(&self) -> &'static str {
        match self {
            AppError::Validation(_) | AppError::InvalidBody(_) => "validation_error",
            AppError::Generation { kind, .. } => kind.category(),
            AppError::Render(_) => "render_error",
            AppError::RequestTimeout(_) => ErrorKind::Timeout.category(),
            AppError::Internal(_) => "internal_error",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::Render(RenderError::Empty) => {
                StatusCode::BAD_REQUEST
            }
            AppError::InvalidBody(rejection) => rejection.status(),
            AppError::RequestTimeout(_) => StatusCode::REQUEST_TIMEOUT,
            AppError::Render(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Generation { kind, .. } => match kind {
                ErrorKind::Validation => StatusCode::BAD_REQUEST,
                ErrorKind::RateLimited | ErrorKind::Timeout => StatusCode::SERVICE_UNAVAILABLE,
                ErrorKind::UpstreamError | ErrorKind::EmptyResponse => StatusCode::BAD_GATEWAY,
                // The service's own credential is at fault; the caller cannot fix it.
                ErrorKind::Unauthorized | ErrorKind::NotConfigured => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
        }
    }

    /// The client-facing payload. Internal errors get a generic detail.
    pub fn body(&self) -> ErrorBody {
        let detail = match self {
            AppError::Validation(e) => e.to_string(),
            AppError::InvalidBody(rejection) => rejection.body_text(),
            AppError::Generation { message, .. } => message.clone(),
            AppError::Render(e) => e.to_string(),
            AppError::RequestTimeout(limit) => format!(
                "request did not complete within {} seconds",
                limit.as_secs()
            ),
            AppError::Internal(_) => "An internal server error occurred".to_string(),
        };
        ErrorBody::new(self.category(), detail)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::Validation(e) => tracing::info!("Rejected request: {e}"),
            AppError::InvalidBody(e) => tracing::info!("Rejected request body: {e}"),
            AppError::Generation { kind, message } => {
                tracing::error!("Generation error ({}): {message}", kind.category())
            }
            AppError::Render(e) => tracing::error!("Render error: {e}"),
            AppError::RequestTimeout(limit) => {
                tracing::warn!("Request cut off after {}s", limit.as_secs())
            }
            AppError::Internal(e) => tracing::error!("Internal error: {e:?}"),
        }

        (self.status(), Json(self.body())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping_per_kind() {
        let status = |kind| {
            AppError::Generation {
                kind,
                message: String::new(),
            }
            .status()
        };
        assert_eq!(status(ErrorKind::RateLimited), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(status(ErrorKind::Timeout), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(status(ErrorKind::UpstreamError), StatusCode::BAD_GATEWAY);
        assert_eq!(status(ErrorKind::EmptyResponse), StatusCode::BAD_GATEWAY);
        assert_eq!(status(ErrorKind::Unauthorized), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(status(ErrorKind::NotConfigured), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_validation_is_bad_request() {
        let err = AppError::from(ValidationError::Empty);
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.category(), "validation_error");
    }

    #[test]
    fn test_internal_detail_is_generic() {
        let err = AppError::Internal(anyhow::anyhow!("secret path /etc/creds"));
        let body = err.body();
        assert_eq!(body.error, "internal_error");
        assert!(!body.detail.contains("/etc/creds"));
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_request_timeout_is_408_with_timeout_category() {
        let err = AppError::RequestTimeout(Duration::from_secs(240));
        assert_eq!(err.status(), StatusCode::REQUEST_TIMEOUT);
        let body = err.body();
        assert_eq!(body.error, "timeout");
        assert!(body.detail.contains("240 seconds"));
    }

    #[test]
    fn test_generation_body_keeps_message() {
        let body = AppError::Generation {
            kind: ErrorKind::RateLimited,
            message: "the model provider is rate limiting requests".to_string(),
        }
        .body();
        assert_eq!(body.error, "rate_limited");
        assert_eq!(body.detail, "the model provider is rate limiting requests");
    }
}
