//! Resume Generation: the single-request pipeline.
//!
//! Flow: validate → compose prompt → GenerationClient (timeout + retry) → outcome.
//!
//! Validation and prompt composition are synchronous; the model call is the only
//! suspension point.

use std::time::Duration;

use tracing::info;

use crate::generation::prompts::compose;
use crate::generation::validation::{validate, ValidationError};
use crate::llm_client::GenerationClient;
use crate::models::{ErrorKind, GenerationOutcome, ResumeRequest};

/// Runs requests through validation, prompt composition and the model.
#[derive(Clone)]
pub struct ResumeGenerator {
    client: GenerationClient,
    attempt_timeout: Duration,
}

impl ResumeGenerator {
    pub fn new(client: GenerationClient, attempt_timeout: Duration) -> Self {
        Self {
            client,
            attempt_timeout,
        }
    }

    /// Validates a request and builds its prompt. Never touches the network.
    pub fn prepare(&self, request: &ResumeRequest) -> Result<String, ValidationError> {
        validate(request.raw_text())?;
        Ok(compose(request.raw_text()))
    }

    /// Sends a prepared prompt to the model.
    pub async fn generate(&self, prompt: &str) -> GenerationOutcome {
        self.client.generate(prompt, self.attempt_timeout).await
    }

    /// Full pipeline for one request. Validation failures become a `Validation` outcome.
    pub async fn run(&self, request: &ResumeRequest) -> GenerationOutcome {
        match self.prepare(request) {
            Ok(prompt) => {
                info!(
                    "Generating resume from {} characters of input",
                    request.raw_text().chars().count()
                );
                self.generate(&prompt).await
            }
            Err(e) => GenerationOutcome::failure(ErrorKind::Validation, e.to_string()),
        }
    }
}
