//! Retry policy and the attempt state machine driven by `GenerationClient`.

use std::time::Duration;

use crate::llm_client::ModelError;

/// Bounded exponential backoff: `base_delay * 2^(attempt - 1)`, capped at `max_delay`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first one. Always at least 1.
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            max_delay: base_delay.saturating_mul(8),
        }
    }

    /// Delay to wait after failed attempt number `attempt` (1-based).
    pub fn backoff_after(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        self.base_delay
            .saturating_mul(1u32 << exponent)
            .min(self.max_delay)
    }

    /// Sum of every backoff delay a fully failing call would sleep through.
    pub fn total_backoff(&self) -> Duration {
        (1..self.max_attempts)
            .map(|a| self.backoff_after(a))
            .fold(Duration::ZERO, Duration::saturating_add)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(1))
    }
}

/// States of a single `generate` call.
///
/// `Attempting` → `Succeeded` | `TransientFailure` | `Fatal`;
/// `TransientFailure` → `Attempting` while attempts remain, else `RetriesExhausted`.
#[derive(Debug)]
pub enum AttemptState {
    Attempting { attempt: u32 },
    TransientFailure { attempt: u32, error: ModelError },
    Succeeded { attempt: u32, text: String },
    Fatal { attempt: u32, error: ModelError },
    RetriesExhausted { attempt: u32, error: ModelError },
}

impl AttemptState {
    /// Classifies the result of attempt number `attempt`.
    pub fn after_attempt(attempt: u32, result: Result<String, ModelError>) -> Self {
        match result {
            Ok(text) => AttemptState::Succeeded { attempt, text },
            Err(error) if error.kind.is_transient() => {
                AttemptState::TransientFailure { attempt, error }
            }
            Err(error) => AttemptState::Fatal { attempt, error },
        }
    }

    /// Decides what follows a transient failure. Returns the next state and the delay to
    /// sleep before entering it.
    pub fn after_transient(
        policy: &RetryPolicy,
        attempt: u32,
        error: ModelError,
    ) -> (Self, Option<Duration>) {
        if attempt >= policy.max_attempts {
            (AttemptState::RetriesExhausted { attempt, error }, None)
        } else {
            (
                AttemptState::Attempting {
                    attempt: attempt + 1,
                },
                Some(policy.backoff_after(attempt)),
            )
        }
    }
}
