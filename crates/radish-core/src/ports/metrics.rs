//! Metrics port - 計測値の送り先
//!
//! The core reports gauges, counters and latencies here; exposition (HTTP,
//! Prometheus text format, ...) is the adapter's business.
//!
//! # 実装
//! - **NoopMetrics**: 何もしない（`suppress_metrics`）
//! - **InMemoryMetrics**: `impls::metrics` を参照

use std::time::Duration;

/// Outcome label used for latency observations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    Success,
    Failure,
}

impl Outcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::Success => "success",
            Outcome::Failure => "failure",
        }
    }
}

/// Metrics sink. Called from producers and workers concurrently.
pub trait Metrics: Send + Sync {
    /// Worker-count gauge.
    fn workers(&self, count: usize);

    /// Queue-depth gauge; implementations derive the fill ratio
    /// (`depth / capacity * 100`) from the pair.
    fn queue_depth(&self, depth: usize, capacity: usize);

    /// One finished `handle` call for `task`.
    fn task_completed(&self, task: &str, outcome: Outcome, latency: Duration);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMetrics;

impl Metrics for NoopMetrics {
    fn workers(&self, _count: usize) {}

    fn queue_depth(&self, _depth: usize, _capacity: usize) {}

    fn task_completed(&self, _task: &str, _outcome: Outcome, _latency: Duration) {}
}

/// Percent of the queue in use. A zero capacity reads as empty.
pub fn percent_full(depth: usize, capacity: usize) -> f64 {
    if capacity == 0 {
        return 0.0;
    }
    depth as f64 / capacity as f64 * 100.0
}
