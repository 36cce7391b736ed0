//! InMemoryMetrics - プロセス内で値を保持するメトリクス
//!
//! Gauges are atomics; per-task counters and histograms sit behind a mutex that
//! is only held for the bookkeeping itself. `snapshot()` produces a
//! serializable copy for status endpoints or the demo binary.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use serde::Serialize;

use crate::ports::metrics::{Metrics, Outcome, percent_full};

/// Upper bounds (milliseconds) of the latency histogram buckets.
pub const LATENCY_BUCKETS_MS: [f64; 11] = [
    5.0, 10.0, 25.0, 50.0, 100.0, 250.0, 500.0, 1000.0, 2500.0, 5000.0, 10000.0,
];

#[derive(Default)]
pub struct InMemoryMetrics {
    workers: AtomicUsize,
    queue_depth: AtomicUsize,
    // f64 bits
    percent_full: AtomicU64,
    tasks: Mutex<HashMap<String, TaskStats>>,
}

#[derive(Debug, Clone, Default)]
struct TaskStats {
    succeeded: u64,
    failed: u64,
    success_latency: Histogram,
    failure_latency: Histogram,
}

/// Cumulative-bucket histogram in milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Histogram {
    /// `(upper bound, observations <= bound)`; the implicit `+Inf` bucket is `count`.
    pub buckets: Vec<(f64, u64)>,
    pub count: u64,
    pub sum_ms: f64,
}

impl Default for Histogram {
    fn default() -> Self {
        Self {
            buckets: LATENCY_BUCKETS_MS.iter().map(|&le| (le, 0)).collect(),
            count: 0,
            sum_ms: 0.0,
        }
    }
}

impl Histogram {
    pub fn observe(&mut self, ms: f64) {
        for (le, n) in self.buckets.iter_mut() {
            if ms <= *le {
                *n += 1;
            }
        }
        self.count += 1;
        self.sum_ms += ms;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsSnapshot {
    pub workers: usize,
    pub queue_size: usize,
    pub percent_full: f64,
    /// Keyed by task name, sorted.
    pub tasks: BTreeMap<String, TaskSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskSnapshot {
    pub succeeded: u64,
    pub failed: u64,
    pub success_latency: Histogram,
    pub failure_latency: Histogram,
}

impl InMemoryMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let tasks = self
            .tasks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(name, stats)| {
                (
                    name.clone(),
                    TaskSnapshot {
                        succeeded: stats.succeeded,
                        failed: stats.failed,
                        success_latency: stats.success_latency.clone(),
                        failure_latency: stats.failure_latency.clone(),
                    },
                )
            })
            .collect();

        MetricsSnapshot {
            workers: self.workers.load(Ordering::Relaxed),
            queue_size: self.queue_depth.load(Ordering::Relaxed),
            percent_full: f64::from_bits(self.percent_full.load(Ordering::Relaxed)),
            tasks,
        }
    }

    pub fn succeeded(&self, task: &str) -> u64 {
        self.with_task(task, |stats| stats.succeeded)
    }

    pub fn failed(&self, task: &str) -> u64 {
        self.with_task(task, |stats| stats.failed)
    }

    fn with_task<T: Default>(&self, task: &str, f: impl FnOnce(&TaskStats) -> T) -> T {
        self.tasks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(task)
            .map(f)
            .unwrap_or_default()
    }
}

impl Metrics for InMemoryMetrics {
    fn workers(&self, count: usize) {
        self.workers.store(count, Ordering::Relaxed);
    }

    fn queue_depth(&self, depth: usize, capacity: usize) {
        self.queue_depth.store(depth, Ordering::Relaxed);
        self.percent_full
            .store(percent_full(depth, capacity).to_bits(), Ordering::Relaxed);
    }

    fn task_completed(&self, task: &str, outcome: Outcome, latency: Duration) {
        let ms = latency.as_secs_f64() * 1000.0;
        let mut tasks = self.tasks.lock().unwrap_or_else(PoisonError::into_inner);
        let stats = tasks.entry(task.to_string()).or_default();
        match outcome {
            Outcome::Success => {
                stats.succeeded += 1;
                stats.success_latency.observe(ms);
            }
            Outcome::Failure => {
                stats.failed += 1;
                stats.failure_latency.observe(ms);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_by_task_and_outcome() {
        let metrics = InMemoryMetrics::new();
        metrics.task_completed("good", Outcome::Success, Duration::from_millis(3));
        metrics.task_completed("good", Outcome::Success, Duration::from_millis(30));
        metrics.task_completed("bad", Outcome::Failure, Duration::from_millis(700));

        assert_eq!(metrics.succeeded("good"), 2);
        assert_eq!(metrics.failed("good"), 0);
        assert_eq!(metrics.succeeded("bad"), 0);
        assert_eq!(metrics.failed("bad"), 1);
        assert_eq!(metrics.failed("missing"), 0);

        let snapshot = metrics.snapshot();
        let good = &snapshot.tasks["good"];
        assert_eq!(good.success_latency.count, 2);
        assert_eq!(good.failure_latency.count, 0);
        // 3ms lands in every bucket, 30ms from the 50ms bucket upwards
        assert_eq!(good.success_latency.buckets[0], (5.0, 1));
        assert_eq!(good.success_latency.buckets[3], (50.0, 2));
        assert_eq!(snapshot.tasks["bad"].failure_latency.buckets[6], (500.0, 0));
        assert_eq!(snapshot.tasks["bad"].failure_latency.buckets[7], (1000.0, 1));
    }

    #[test]
    fn gauges_track_latest_value() {
        let metrics = InMemoryMetrics::new();
        metrics.workers(4);
        metrics.queue_depth(25, 100);
        metrics.workers(2);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.workers, 2);
        assert_eq!(snapshot.queue_size, 25);
        assert_eq!(snapshot.percent_full, 25.0);
    }
}
