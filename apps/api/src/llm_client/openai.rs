//! OpenAI-compatible chat completions transport.
//!
//! One `complete` call is exactly one HTTP request. Retries and the outer timeout live in
//! `GenerationClient`; this module only maps provider responses onto `ErrorKind`.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::llm_client::{CompletionRequest, CompletionTransport, ModelError};
use crate::models::ErrorKind;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
/// The model used for all resume generation.
pub const MODEL: &str = "gpt-4o-mini";
const MAX_TOKENS: u32 = 2048;

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    max_tokens: u32,
    messages: [ChatMessage<'a>; 2],
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Talks to `{base_url}/chat/completions`.
///
/// A missing API key is not a startup error: every call fails fast with
/// `ErrorKind::NotConfigured` so operators can tell it apart from a rejected key.
#[derive(Clone)]
pub struct OpenAiTransport {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl OpenAiTransport {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
        })
    }
}

#[async_trait]
impl CompletionTransport for OpenAiTransport {
    async fn complete(&self, request: CompletionRequest<'_>) -> Result<String, ModelError> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Err(ModelError::new(
                ErrorKind::NotConfigured,
                "OPENAI_API_KEY is not set; the service cannot generate resumes without it",
            ));
        };

        let body = ChatRequest {
            model: MODEL,
            temperature: request.temperature,
            max_tokens: MAX_TOKENS,
            messages: [
                ChatMessage {
                    role: "system",
                    content: request.system,
                },
                ChatMessage {
                    role: "user",
                    content: request.prompt,
                },
            ],
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(api_key)
            .timeout(request.timeout)
            .json(&body)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(map_status(status, &body));
        }

        let parsed: ChatResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                map_transport_error(e)
            } else {
                ModelError::new(
                    ErrorKind::UpstreamError,
                    format!("malformed completion response: {e}"),
                )
            }
        })?;

        if let Some(usage) = &parsed.usage {
            debug!(
                "Model call succeeded: prompt_tokens={}, completion_tokens={}",
                usage.prompt_tokens, usage.completion_tokens
            );
        }

        Ok(parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default())
    }
}

fn map_transport_error(e: reqwest::Error) -> ModelError {
    if e.is_timeout() {
        ModelError::new(ErrorKind::Timeout, "model request timed out")
    } else {
        ModelError::new(
            ErrorKind::UpstreamError,
            format!("could not reach model provider: {e}"),
        )
    }
}

/// Maps a non-2xx provider response onto the failure taxonomy.
///
/// Credential failures get a fixed message: provider bodies for 401 can echo part of the key.
fn map_status(status: StatusCode, body: &str) -> ModelError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            warn!("Model provider rejected the configured credential ({status})");
            ModelError::new(
                ErrorKind::Unauthorized,
                "the model provider rejected the configured API key",
            )
        }
        StatusCode::TOO_MANY_REQUESTS => {
            warn!("Model provider rate limited the request");
            ModelError::new(ErrorKind::RateLimited, "the model provider is rate limiting requests")
        }
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            ModelError::new(ErrorKind::Timeout, format!("model provider timed out ({status})"))
        }
        _ => {
            let message = serde_json::from_str::<ApiError>(body)
                .map(|e| e.error.message)
                .unwrap_or_else(|_| body.chars().take(200).collect());
            warn!("Model provider returned {status}: {message}");
            ModelError::new(
                ErrorKind::UpstreamError,
                format!("model provider returned {status}: {message}"),
            )
        }
    }
}
