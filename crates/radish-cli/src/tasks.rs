//! Turnip - 確率的なモックタスク
//!
//! Sleeps for a random duration in `[min, min + max)` (divided by the speed
//! factor) and then fails with a fixed probability.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use radish_core::{BoxError, FutureId, Task};
use tokio::sync::Notify;
use tracing::debug;

/// Finished-future counter shared by all turnips.
#[derive(Default)]
pub struct Progress {
    succeeded: AtomicUsize,
    failed: AtomicUsize,
    notify: Notify,
}

impl Progress {
    pub fn succeeded(&self) -> usize {
        self.succeeded.load(Ordering::SeqCst)
    }

    pub fn failed(&self) -> usize {
        self.failed.load(Ordering::SeqCst)
    }

    pub fn finished(&self) -> usize {
        self.succeeded() + self.failed()
    }

    /// Resolves once at least `n` futures have finished.
    pub async fn wait_for(&self, n: usize) {
        loop {
            let notified = self.notify.notified();
            if self.finished() >= n {
                return;
            }
            notified.await;
        }
    }

    fn record(&self, counter: &AtomicUsize) {
        counter.fetch_add(1, Ordering::SeqCst);
        self.notify.notify_waiters();
    }
}

pub struct Turnip {
    name: &'static str,
    min_delay: Duration,
    max_delay: Duration,
    err_prob: f64,
    speed: f64,
    progress: Arc<Progress>,
}

impl Turnip {
    /// short, medium, long and chance.
    pub fn patch(speed: f64, progress: &Arc<Progress>) -> Vec<Arc<dyn Task>> {
        let turnip =
            |name: &'static str, min_ms: u64, max_ms: u64, err_prob: f64| -> Arc<dyn Task> {
                Arc::new(Turnip {
                    name,
                    min_delay: Duration::from_millis(min_ms),
                    max_delay: Duration::from_millis(max_ms),
                    err_prob,
                    speed,
                    progress: Arc::clone(progress),
                })
            };

        vec![
            turnip("short", 50, 1_500, 0.125),
            turnip("medium", 750, 5_000, 0.183),
            turnip("long", 10_000, 120_000, 0.213),
            turnip("chance", 750, 2_000, 0.523),
        ]
    }

    fn pick_delay(&self) -> Duration {
        let jitter = rand::thread_rng().gen_range(Duration::ZERO..self.max_delay);
        (self.min_delay + jitter).div_f64(self.speed)
    }
}

#[async_trait]
impl Task for Turnip {
    fn name(&self) -> &str {
        self.name
    }

    async fn handle(&self, id: FutureId, _params: &[u8]) -> Result<(), BoxError> {
        let delay = self.pick_delay();
        debug!(task = self.name, %id, ?delay, "sleeping");
        tokio::time::sleep(delay).await;

        if rand::random::<f64>() <= self.err_prob {
            return Err(format!(
                "{id} errored after {delay:?} sleep with {:.2} probability",
                self.err_prob
            )
            .into());
        }
        Ok(())
    }

    async fn on_success(&self, _id: FutureId, _params: &[u8]) {
        self.progress.record(&self.progress.succeeded);
    }

    async fn on_failure(&self, _id: FutureId, _err: &BoxError, _params: &[u8]) {
        self.progress.record(&self.progress.failed);
    }
}
