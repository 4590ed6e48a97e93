/// LLM Client: the single point of entry for all model calls in the resume API.
///
/// ARCHITECTURAL RULE: No other module may call the model provider directly.
/// All generation goes through `GenerationClient`, which owns the timeout and retry policy.
/// The provider itself sits behind `CompletionTransport` (one attempt = one network call).
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::models::{ErrorKind, GenerationOutcome};

pub mod openai;
pub mod prompts;
pub mod retry;
#[cfg(test)]
pub mod test_support;

pub use openai::OpenAiTransport;
pub use retry::{AttemptState, RetryPolicy};

/// Sampling temperature for resume generation. Favors consistency over creativity.
pub const TEMPERATURE: f32 = 0.5;
/// Responses shorter than this (after trimming) are treated as empty.
pub const MIN_RESPONSE_CHARS: usize = 50;

/// A failed single attempt against the model provider.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind:?}: {message}")]
pub struct ModelError {
    pub kind: ErrorKind,
    pub message: String,
}

impl ModelError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl From<ModelError> for GenerationOutcome {
    fn from(error: ModelError) -> Self {
        GenerationOutcome::Failure {
            kind: error.kind,
            message: error.message,
        }
    }
}

/// One completion call as seen by a transport.
#[derive(Debug, Clone, Copy)]
pub struct CompletionRequest<'a> {
    pub system: &'a str,
    pub prompt: &'a str,
    pub temperature: f32,
    pub timeout: Duration,
}

/// A single attempt against a model provider. Implementations must not retry.
#[async_trait]
pub trait CompletionTransport: Send + Sync {
    async fn complete(&self, request: CompletionRequest<'_>) -> Result<String, ModelError>;
}

/// The generation client used by the pipeline.
/// Wraps a transport with per-attempt timeouts, output cleanup and the retry state machine.
#[derive(Clone)]
pub struct GenerationClient {
    transport: Arc<dyn CompletionTransport>,
    policy: RetryPolicy,
}

impl GenerationClient {
    pub fn new(transport: Arc<dyn CompletionTransport>, policy: RetryPolicy) -> Self {
        Self { transport, policy }
    }

    /// Generates resume markdown for an already-composed prompt.
    ///
    /// Transient failures are retried with exponential backoff up to the policy's attempt
    /// cap; fatal failures return after the attempt that produced them.
    pub async fn generate(&self, prompt: &str, timeout: Duration) -> GenerationOutcome {
        let mut state = AttemptState::Attempting { attempt: 1 };

        loop {
            state = match state {
                AttemptState::Attempting { attempt } => {
                    let result = self.attempt(prompt, timeout).await;
                    AttemptState::after_attempt(attempt, result)
                }
                AttemptState::TransientFailure { attempt, error } => {
                    let (next, delay) =
                        AttemptState::after_transient(&self.policy, attempt, error.clone());
                    if let Some(delay) = delay {
                        warn!(
                            "Generation attempt {}/{} failed ({}), retrying after {}ms...",
                            attempt,
                            self.policy.max_attempts,
                            error,
                            delay.as_millis()
                        );
                        tokio::time::sleep(delay).await;
                    }
                    next
                }
                AttemptState::Succeeded { attempt, text } => {
                    info!("Generation succeeded on attempt {attempt}");
                    return GenerationOutcome::Success {
                        resume_markdown: text,
                    };
                }
                AttemptState::Fatal { attempt, error } => {
                    warn!("Generation failed on attempt {attempt} without retry: {error}");
                    return error.into();
                }
                AttemptState::RetriesExhausted { attempt, error } => {
                    warn!("Generation gave up after {attempt} attempts: {error}");
                    return error.into();
                }
            };
        }
    }

    /// Runs exactly one transport call under `timeout` and validates the text it returns.
    async fn attempt(&self, prompt: &str, timeout: Duration) -> Result<String, ModelError> {
        let request = CompletionRequest {
            system: prompts::RESUME_WRITER_SYSTEM,
            prompt,
            temperature: TEMPERATURE,
            timeout,
        };

        let text = match tokio::time::timeout(timeout, self.transport.complete(request)).await {
            Ok(result) => result?,
            Err(_) => {
                return Err(ModelError::new(
                    ErrorKind::Timeout,
                    format!("model did not respond within {}s", timeout.as_secs_f64()),
                ))
            }
        };

        let text = strip_markdown_fences(&text);
        if text.chars().count() < MIN_RESPONSE_CHARS {
            debug!("Model returned {} characters", text.chars().count());
            return Err(ModelError::new(
                ErrorKind::EmptyResponse,
                "model returned an empty or truncated resume",
            ));
        }

        Ok(text.to_string())
    }
}

/// Strips ```markdown ... ```, ```md ... ``` or ``` ... ``` fences from model output.
fn strip_markdown_fences(text: &str) -> &str {
    let text = text.trim();
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let rest = rest
        .strip_prefix("markdown")
        .or_else(|| rest.strip_prefix("md"))
        .unwrap_or(rest);
    rest.trim_start()
        .strip_suffix("```")
        .map(|s| s.trim())
        .unwrap_or(rest.trim_start())
}
