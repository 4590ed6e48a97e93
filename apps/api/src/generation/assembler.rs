//! Wraps pipeline outcomes with timing metadata for the HTTP boundary.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::errors::{AppError, ErrorBody};
use crate::generation::sections::missing_sections;
use crate::models::{BatchItemResult, GenerationOutcome};

/// Success payload for one generated resume.
#[derive(Debug, Clone, Serialize)]
pub struct ResumeResponse {
    pub resume: String,
    /// Seconds spent in the pipeline for this resume.
    pub processing_time: f64,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub missing_sections: Vec<&'static str>,
}

/// An outcome stamped at assembly time.
#[derive(Debug, Clone)]
pub struct AssembledResult {
    pub outcome: GenerationOutcome,
    pub processing_time: Duration,
    pub timestamp: DateTime<Utc>,
}

impl AssembledResult {
    /// Splits into the boundary success payload or the error to report.
    pub fn into_response(self) -> Result<ResumeResponse, AppError> {
        match self.outcome {
            GenerationOutcome::Success { resume_markdown } => Ok(ResumeResponse {
                missing_sections: missing_sections(&resume_markdown),
                resume: resume_markdown,
                processing_time: seconds(self.processing_time),
                timestamp: self.timestamp,
            }),
            GenerationOutcome::Failure { kind, message } => {
                Err(AppError::Generation { kind, message })
            }
        }
    }
}

/// One batch entry: the item's position plus either payload shape.
#[derive(Debug, Clone, Serialize)]
pub struct BatchItemResponse {
    pub index: usize,
    #[serde(flatten)]
    pub body: BatchItemBody,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum BatchItemBody {
    Success(ResumeResponse),
    Failure(ErrorBody),
}

/// Stamps an outcome with its processing time and the current time.
pub fn assemble(outcome: GenerationOutcome, processing_time: Duration) -> AssembledResult {
    AssembledResult {
        outcome,
        processing_time,
        timestamp: Utc::now(),
    }
}

/// Converts ordered batch results into boundary payloads, keeping their order.
pub fn assemble_batch(results: Vec<BatchItemResult>) -> Vec<BatchItemResponse> {
    results
        .into_iter()
        .map(|item| {
            let body = match assemble(item.outcome, item.processing_time).into_response() {
                Ok(success) => BatchItemBody::Success(success),
                Err(failure) => BatchItemBody::Failure(failure.body()),
            };
            BatchItemResponse {
                index: item.index,
                body,
            }
        })
        .collect()
}

/// Seconds with millisecond precision.
fn seconds(duration: Duration) -> f64 {
    (duration.as_secs_f64() * 1000.0).round() / 1000.0
}
