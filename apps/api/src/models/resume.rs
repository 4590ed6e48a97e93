use std::time::Duration;

use serde::{Deserialize, Serialize};

/// One resume-generation request as received at ingress.
///
/// The raw text is kept verbatim; validation happens separately so that a batch can
/// turn an invalid item into a per-item failure instead of rejecting the whole call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResumeRequest {
    raw_text: String,
}

impl ResumeRequest {
    pub fn new(raw_text: impl Into<String>) -> Self {
        Self {
            raw_text: raw_text.into(),
        }
    }

    pub fn raw_text(&self) -> &str {
        &self.raw_text
    }
}

/// Failure categories surfaced by the generation pipeline.
///
/// Only `RateLimited`, `Timeout` and `UpstreamError` are transient. `Validation` is
/// never produced by the model client; the batch pipeline uses it for items rejected
/// before any network call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    RateLimited,
    Unauthorized,
    NotConfigured,
    Timeout,
    UpstreamError,
    EmptyResponse,
}

impl ErrorKind {
    pub const ALL: [ErrorKind; 7] = [
        ErrorKind::Validation,
        ErrorKind::RateLimited,
        ErrorKind::Unauthorized,
        ErrorKind::NotConfigured,
        ErrorKind::Timeout,
        ErrorKind::UpstreamError,
        ErrorKind::EmptyResponse,
    ];

    /// Whether another attempt could plausibly succeed without operator action.
    pub fn is_transient(self) -> bool {
        matches!(
            self,
            ErrorKind::RateLimited | ErrorKind::Timeout | ErrorKind::UpstreamError
        )
    }

    /// Stable category string used in error payloads and stats.
    pub fn category(self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation_error",
            ErrorKind::RateLimited => "rate_limited",
            ErrorKind::Unauthorized => "unauthorized",
            ErrorKind::NotConfigured => "configuration_error",
            ErrorKind::Timeout => "timeout",
            ErrorKind::UpstreamError => "upstream_error",
            ErrorKind::EmptyResponse => "empty_response",
        }
    }

    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

/// Result of one trip through the generation pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum GenerationOutcome {
    Success { resume_markdown: String },
    Failure { kind: ErrorKind, message: String },
}

impl GenerationOutcome {
    pub fn failure(kind: ErrorKind, message: impl Into<String>) -> Self {
        GenerationOutcome::Failure {
            kind,
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, GenerationOutcome::Success { .. })
    }

    pub fn error_kind(&self) -> Option<ErrorKind> {
        match self {
            GenerationOutcome::Success { .. } => None,
            GenerationOutcome::Failure { kind, .. } => Some(*kind),
        }
    }
}

/// Outcome of a single batch item, tagged with its position in the input.
#[derive(Debug, Clone)]
pub struct BatchItemResult {
    pub index: usize,
    pub outcome: GenerationOutcome,
    pub processing_time: Duration,
}
