//! Batch orchestration: bounded fan-out over independent resume requests.
//!
//! Every input item gets exactly one result slot, addressed by its original index.
//! Tasks write their own slot; completion order never affects output order.

use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::Instant;
use tracing::{info, warn};

use crate::generation::generator::ResumeGenerator;
use crate::generation::validation::{validate_batch_size, ValidationError};
use crate::models::{BatchItemResult, ErrorKind, GenerationOutcome, ResumeRequest};

#[derive(Clone)]
pub struct BatchOrchestrator {
    generator: Arc<ResumeGenerator>,
}

impl BatchOrchestrator {
    pub fn new(generator: Arc<ResumeGenerator>) -> Self {
        Self { generator }
    }

    /// Runs every request with at most `concurrency_limit` model calls in flight.
    ///
    /// An oversized or empty batch is rejected before any item is looked at. After that,
    /// per-item failures (validation included) are reported at the item's position and
    /// never cancel siblings.
    pub async fn run_batch(
        &self,
        requests: Vec<ResumeRequest>,
        concurrency_limit: usize,
    ) -> Result<Vec<BatchItemResult>, ValidationError> {
        validate_batch_size(requests.len())?;

        let total = requests.len();
        let limit = concurrency_limit.max(1);
        info!("Starting batch of {total} items (concurrency {limit})");

        let semaphore = Arc::new(Semaphore::new(limit));
        let mut slots: Vec<Option<BatchItemResult>> = (0..total).map(|_| None).collect();
        let mut tasks = JoinSet::new();

        for (index, request) in requests.into_iter().enumerate() {
            let generator = Arc::clone(&self.generator);
            let semaphore = Arc::clone(&semaphore);

            tasks.spawn(async move {
                let started = Instant::now();

                // Invalid items are settled without taking a worker slot.
                let prompt = match generator.prepare(&request) {
                    Ok(prompt) => prompt,
                    Err(e) => {
                        return BatchItemResult {
                            index,
                            outcome: GenerationOutcome::failure(
                                ErrorKind::Validation,
                                e.to_string(),
                            ),
                            processing_time: started.elapsed(),
                        }
                    }
                };

                let Ok(_permit) = semaphore.acquire_owned().await else {
                    return BatchItemResult {
                        index,
                        outcome: GenerationOutcome::failure(
                            ErrorKind::UpstreamError,
                            "batch worker pool closed",
                        ),
                        processing_time: started.elapsed(),
                    };
                };

                // Timing covers the pipeline stages, not the wait for a worker.
                let started = Instant::now();
                let outcome = generator.generate(&prompt).await;
                BatchItemResult {
                    index,
                    outcome,
                    processing_time: started.elapsed(),
                }
            });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(result) => {
                    let index = result.index;
                    slots[index] = Some(result);
                }
                Err(e) => warn!("Batch item task failed: {e}"),
            }
        }

        let results: Vec<BatchItemResult> = slots
            .into_iter()
            .enumerate()
            .map(|(index, slot)| {
                slot.unwrap_or_else(|| BatchItemResult {
                    index,
                    outcome: GenerationOutcome::failure(
                        ErrorKind::UpstreamError,
                        "item did not complete",
                    ),
                    processing_time: Default::default(),
                })
            })
            .collect();

        let succeeded = results.iter().filter(|r| r.outcome.is_success()).count();
        info!(
            "Batch finished: {succeeded}/{total} succeeded, {} failed",
            total - succeeded
        );

        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::test_support::{ScriptedTransport, SAMPLE_INPUT};
    use crate::llm_client::{GenerationClient, ModelError, RetryPolicy};
    use std::time::Duration;

    fn orchestrator(transport: Arc<ScriptedTransport>) -> BatchOrchestrator {
        let client = GenerationClient::new(transport, RetryPolicy::new(1, Duration::ZERO));
        BatchOrchestrator::new(Arc::new(ResumeGenerator::new(
            client,
            Duration::from_secs(30),
        )))
    }

    fn valid(tag: &str) -> ResumeRequest {
        ResumeRequest::new(format!("{tag} {SAMPLE_INPUT}"))
    }

    #[tokio::test]
    async fn test_invalid_item_fails_in_place() {
        let transport = Arc::new(ScriptedTransport::new(vec![]));
        let requests = vec![
            valid("one"),
            valid("two"),
            ResumeRequest::new("too short"),
            valid("four"),
        ];

        let results = orchestrator(transport.clone())
            .run_batch(requests, 2)
            .await
            .unwrap();

        assert_eq!(results.len(), 4);
        let kinds: Vec<_> = results.iter().map(|r| r.outcome.error_kind()).collect();
        assert_eq!(kinds, vec![None, None, Some(ErrorKind::Validation), None]);
        let indices: Vec<_> = results.iter().map(|r| r.index).collect();
        assert_eq!(indices, vec![0, 1, 2, 3]);
        assert_eq!(transport.calls(), 3);
    }

    #[tokio::test]
    async fn test_oversized_batch_is_rejected_wholesale() {
        let transport = Arc::new(ScriptedTransport::new(vec![]));
        let requests: Vec<_> = (0..11).map(|i| valid(&i.to_string())).collect();

        let err = orchestrator(transport.clone())
            .run_batch(requests, 4)
            .await
            .unwrap_err();

        assert_eq!(err, ValidationError::BatchTooLarge { max: 10, actual: 11 });
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn test_empty_batch_is_rejected() {
        let transport = Arc::new(ScriptedTransport::new(vec![]));
        let err = orchestrator(transport)
            .run_batch(Vec::new(), 4)
            .await
            .unwrap_err();
        assert_eq!(err, ValidationError::EmptyBatch);
    }

    #[tokio::test(start_paused = true)]
    async fn test_output_order_ignores_completion_order() {
        // Item 0 is the slowest, item 2 the fastest.
        let transport = Arc::new(ScriptedTransport::new(vec![]).with_delay_fn(|prompt| {
            if prompt.contains("slow ") {
                Duration::from_millis(300)
            } else if prompt.contains("medium ") {
                Duration::from_millis(200)
            } else {
                Duration::from_millis(100)
            }
        }));
        let requests = vec![valid("slow"), valid("medium"), valid("fast")];

        let results = orchestrator(transport)
            .run_batch(requests, 3)
            .await
            .unwrap();

        let indices: Vec<_> = results.iter().map(|r| r.index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
        assert!(results[0].processing_time >= Duration::from_millis(300));
        assert!(results[2].processing_time < Duration::from_millis(200));
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrency_limit_is_respected() {
        let transport =
            Arc::new(ScriptedTransport::new(vec![]).with_delay(Duration::from_millis(100)));
        let requests: Vec<_> = (0..7).map(|i| valid(&i.to_string())).collect();

        let started = Instant::now();
        let results = orchestrator(transport.clone())
            .run_batch(requests, 3)
            .await
            .unwrap();

        assert_eq!(results.len(), 7);
        assert_eq!(transport.max_in_flight(), 3);
        // Seven items at three-wide run in three waves.
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_millis(300));
        assert!(elapsed < Duration::from_millis(400));
    }

    #[tokio::test(start_paused = true)]
    async fn test_wall_time_is_one_wave_when_under_limit() {
        let transport =
            Arc::new(ScriptedTransport::new(vec![]).with_delay(Duration::from_millis(500)));
        let requests: Vec<_> = (0..5).map(|i| valid(&i.to_string())).collect();

        let started = Instant::now();
        orchestrator(transport).run_batch(requests, 5).await.unwrap();

        assert!(started.elapsed() < Duration::from_millis(1000));
    }

    #[tokio::test]
    async fn test_upstream_failure_does_not_cancel_siblings() {
        let transport = Arc::new(ScriptedTransport::new(vec![Err(ModelError::new(
            ErrorKind::Unauthorized,
            "rejected",
        ))]));
        let requests = vec![valid("a"), valid("b"), valid("c")];

        // Concurrency 1 makes the first model call deterministic.
        let results = orchestrator(transport)
            .run_batch(requests, 1)
            .await
            .unwrap();

        assert_eq!(results[0].outcome.error_kind(), Some(ErrorKind::Unauthorized));
        assert!(results[1].outcome.is_success());
        assert!(results[2].outcome.is_success());
    }

    #[tokio::test]
    async fn test_zero_concurrency_is_treated_as_one() {
        let transport = Arc::new(ScriptedTransport::new(vec![]));
        let results = orchestrator(transport.clone())
            .run_batch(vec![valid("a"), valid("b")], 0)
            .await
            .unwrap();
        assert!(results.iter().all(|r| r.outcome.is_success()));
        assert_eq!(transport.max_in_flight(), 1);
    }
}
