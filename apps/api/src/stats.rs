//! Process-wide service counters, exposed at `GET /api/stats`.
//!
//! Created once at startup and shared through `AppState`. All updates are relaxed
//! atomic increments; nothing is persisted across restarts.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::time::Instant;

use crate::models::{ErrorKind, GenerationOutcome};

#[derive(Debug)]
pub struct ServiceStats {
    started_at: Instant,
    started_at_utc: DateTime<Utc>,
    requests_served: AtomicU64,
    single_requests: AtomicU64,
    batch_requests: AtomicU64,
    batch_items: AtomicU64,
    resumes_generated: AtomicU64,
    documents_rendered: AtomicU64,
    render_failures: AtomicU64,
    failures: [AtomicU64; ErrorKind::ALL.len()],
}

#[derive(Debug, Clone, Serialize)]
pub struct StatsSnapshot {
    pub started_at: DateTime<Utc>,
    pub uptime_seconds: u64,
    pub requests_served: u64,
    pub single_requests: u64,
    pub batch_requests: u64,
    pub batch_items: u64,
    pub resumes_generated: u64,
    pub documents_rendered: u64,
    pub render_failures: u64,
    /// Generation failures keyed by error category. Every category is present.
    pub failures: BTreeMap<&'static str, u64>,
}

impl Default for ServiceStats {
    fn default() -> Self {
        Self::new()
    }
}

impl ServiceStats {
    pub fn new() -> Self {
        Self {
            started_at: Instant::now(),
            started_at_utc: Utc::now(),
            requests_served: AtomicU64::new(0),
            single_requests: AtomicU64::new(0),
            batch_requests: AtomicU64::new(0),
            batch_items: AtomicU64::new(0),
            resumes_generated: AtomicU64::new(0),
            documents_rendered: AtomicU64::new(0),
            render_failures: AtomicU64::new(0),
            failures: std::array::from_fn(|_| AtomicU64::new(0)),
        }
    }

    pub fn record_single_request(&self) {
        self.requests_served.fetch_add(1, Ordering::Relaxed);
        self.single_requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_batch_request(&self) {
        self.requests_served.fetch_add(1, Ordering::Relaxed);
        self.batch_requests.fetch_add(1, Ordering::Relaxed);
    }

    /// Items of a batch that passed size validation and will be processed.
    pub fn record_batch_items(&self, items: usize) {
        self.batch_items.fetch_add(items as u64, Ordering::Relaxed);
    }

    pub fn record_render_request(&self) {
        self.requests_served.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_outcome(&self, outcome: &GenerationOutcome) {
        match outcome.error_kind() {
            None => {
                self.resumes_generated.fetch_add(1, Ordering::Relaxed);
            }
            Some(kind) => self.record_failure(kind),
        }
    }

    pub fn record_failure(&self, kind: ErrorKind) {
        self.failures[kind.index()].fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_render(&self, succeeded: bool) {
        let counter = if succeeded {
            &self.documents_rendered
        } else {
            &self.render_failures
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        let failures = ErrorKind::ALL
            .iter()
            .map(|kind| {
                (
                    kind.category(),
                    self.failures[kind.index()].load(Ordering::Relaxed),
                )
            })
            .collect();

        StatsSnapshot {
            started_at: self.started_at_utc,
            uptime_seconds: self.started_at.elapsed().as_secs(),
            requests_served: self.requests_served.load(Ordering::Relaxed),
            single_requests: self.single_requests.load(Ordering::Relaxed),
            batch_requests: self.batch_requests.load(Ordering::Relaxed),
            batch_items: self.batch_items.load(Ordering::Relaxed),
            resumes_generated: self.resumes_generated.load(Ordering::Relaxed),
            documents_rendered: self.documents_rendered.load(Ordering::Relaxed),
            render_failures: self.render_failures.load(Ordering::Relaxed),
            failures,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    #[test]
    fn test_fresh_snapshot_is_zeroed() {
        let snapshot = ServiceStats::new().snapshot();
        assert_eq!(snapshot.requests_served, 0);
        assert_eq!(snapshot.failures.len(), ErrorKind::ALL.len());
        assert!(snapshot.failures.values().all(|&n| n == 0));
    }

    #[test]
    fn test_outcomes_land_in_matching_counters() {
        let stats = ServiceStats::new();
        stats.record_single_request();
        stats.record_batch_request();
        stats.record_batch_items(3);
        stats.record_outcome(&GenerationOutcome::Success {
            resume_markdown: String::new(),
        });
        stats.record_outcome(&GenerationOutcome::failure(ErrorKind::RateLimited, "slow down"));
        stats.record_outcome(&GenerationOutcome::failure(ErrorKind::RateLimited, "slow down"));
        stats.record_failure(ErrorKind::Validation);
        stats.record_render(true);
        stats.record_render(false);

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.requests_served, 2);
        assert_eq!(snapshot.single_requests, 1);
        assert_eq!(snapshot.batch_requests, 1);
        assert_eq!(snapshot.batch_items, 3);
        assert_eq!(snapshot.resumes_generated, 1);
        assert_eq!(snapshot.failures["rate_limited"], 2);
        assert_eq!(snapshot.failures["validation_error"], 1);
        assert_eq!(snapshot.failures["timeout"], 0);
        assert_eq!(snapshot.documents_rendered, 1);
        assert_eq!(snapshot.render_failures, 1);
    }

    #[tokio::test]
    async fn test_concurrent_increments_are_not_lost() {
        let stats = Arc::new(ServiceStats::new());
        let mut handles = Vec::new();
        for _ in 0..8 {
            let stats = Arc::clone(&stats);
            handles.push(tokio::spawn(async move {
                for _ in 0..100 {
                    stats.record_single_request();
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }
        assert_eq!(stats.snapshot().single_requests, 800);
    }

    #[tokio::test(start_paused = true)]
    async fn test_uptime_advances() {
        let stats = ServiceStats::new();
        tokio::time::advance(Duration::from_secs(90)).await;
        assert_eq!(stats.snapshot().uptime_seconds, 90);
    }
}
