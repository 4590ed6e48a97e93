//! Scripted in-memory transport for tests. Never compiled into the binary.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::llm_client::{CompletionRequest, CompletionTransport, ModelError};

/// A resume the way the model is asked to write it.
pub const SAMPLE_RESUME: &str = "# Jane Doe
Senior Payments Engineer
555-0100 | jane@example.com | linkedin.com/in/janedoe | Chicago, IL

## Professional Summary
Backend engineer with eight years building payment systems.

## Professional Experience
**ACME CORP** | *Senior Engineer* | Chicago, IL | Jan 2019 - Present
- Cut settlement latency by 40% by redesigning the ledger pipeline

## Education
**BACHELOR OF SCIENCE IN COMPUTER SCIENCE**, University of Illinois, 2016

## Skills
- Rust, Go, PostgreSQL, Kafka
";

/// Realistic raw input that passes validation.
pub const SAMPLE_INPUT: &str = "Jane Doe, jane@example.com, 555-0100. Eight years as a backend engineer at Acme Corp building payment systems. BSc Computer Science, University of Illinois 2016. Skills: Rust, Go, PostgreSQL.";

type DelayFn = Box<dyn Fn(&str) -> Duration + Send + Sync>;

#[derive(Debug, Clone)]
pub struct SeenRequest {
    pub system: String,
    pub prompt: String,
    pub temperature: f32,
}

/// Replays queued results in order, then falls back to a repeating result.
pub struct ScriptedTransport {
    script: Mutex<VecDeque<Result<String, ModelError>>>,
    fallback: Result<String, ModelError>,
    delay: DelayFn,
    calls: AtomicU32,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    last_request: Mutex<Option<SeenRequest>>,
}

impl ScriptedTransport {
    pub fn new(script: Vec<Result<String, ModelError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            fallback: Ok(SAMPLE_RESUME.to_string()),
            delay: Box::new(|_| Duration::ZERO),
            calls: AtomicU32::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        }
    }

    pub fn repeating(result: Result<String, ModelError>) -> Self {
        Self {
            fallback: result,
            ..Self::new(Vec::new())
        }
    }

    pub fn with_delay(self, delay: Duration) -> Self {
        self.with_delay_fn(move |_| delay)
    }

    /// Per-prompt latency, e.g. to make an early batch item finish last.
    pub fn with_delay_fn(mut self, f: impl Fn(&str) -> Duration + Send + Sync + 'static) -> Self {
        self.delay = Box::new(f);
        self
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<SeenRequest> {
        self.last_request.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionTransport for ScriptedTransport {
    async fn complete(&self, request: CompletionRequest<'_>) -> Result<String, ModelError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some(SeenRequest {
            system: request.system.to_string(),
            prompt: request.prompt.to_string(),
            temperature: request.temperature,
        });

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let delay = (self.delay)(request.prompt);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let next = self.script.lock().unwrap().pop_front();
        next.unwrap_or_else(|| self.fallback.clone())
    }
}
