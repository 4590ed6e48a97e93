use std::time::Duration;

use anyhow::{Context, Result};
use tracing::warn;

use crate::llm_client::openai::DEFAULT_BASE_URL;
use crate::llm_client::RetryPolicy;

/// Application configuration loaded from environment variables.
/// Every field has a default except the model API key, which may be absent.
#[derive(Debug, Clone)]
pub struct Config {
    /// `None` leaves the service up; generation requests then fail as not configured.
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub port: u16,
    pub rust_log: String,
    /// Per-attempt budget for one model call.
    pub generation_timeout: Duration,
    pub generation_max_attempts: u32,
    pub generation_backoff: Duration,
    pub batch_concurrency: usize,
    /// Outer budget for a whole HTTP request.
    pub request_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from any key lookup. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Ok(Config {
            openai_api_key: get("OPENAI_API_KEY"),
            openai_base_url: get("OPENAI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            port: parse_or(get("PORT"), "PORT", 8000)?,
            rust_log: get("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            generation_timeout: Duration::from_secs(parse_or(
                get("GENERATION_TIMEOUT_SECS"),
                "GENERATION_TIMEOUT_SECS",
                60,
            )?),
            generation_max_attempts: parse_or(
                get("GENERATION_MAX_ATTEMPTS"),
                "GENERATION_MAX_ATTEMPTS",
                3,
            )?,
            generation_backoff: Duration::from_millis(parse_or(
                get("GENERATION_BACKOFF_MS"),
                "GENERATION_BACKOFF_MS",
                1000,
            )?),
            batch_concurrency: parse_or(get("BATCH_CONCURRENCY"), "BATCH_CONCURRENCY", 3)?,
            request_timeout: Duration::from_secs(parse_or(
                get("REQUEST_TIMEOUT_SECS"),
                "REQUEST_TIMEOUT_SECS",
                240,
            )?),
        })
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.generation_max_attempts, self.generation_backoff)
    }

    /// Worst case for one resume: every attempt times out and every backoff is taken.
    pub fn worst_case_generation(&self) -> Duration {
        let policy = self.retry_policy();
        self.generation_timeout
            .saturating_mul(policy.max_attempts)
            .saturating_add(policy.total_backoff())
    }

    /// Logs startup warnings for settings that work but will misbehave.
    pub fn warn_on_suspicious(&self) {
        if self.openai_api_key.is_none() {
            warn!("OPENAI_API_KEY is not set; generation requests will fail until it is configured");
        }
        let worst = self.worst_case_generation();
        if worst > self.request_timeout {
            warn!(
                "Worst-case generation time ({}s) exceeds REQUEST_TIMEOUT_SECS ({}s); slow requests will be cut off",
                worst.as_secs(),
                self.request_timeout.as_secs()
            );
        }
    }
}

fn parse_or<T>(value: Option<String>, key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match value {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number (got '{raw}')")),
        None => Ok(default),
    }
}
