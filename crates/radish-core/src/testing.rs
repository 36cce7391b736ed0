//! Test tasks shared by the unit tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Semaphore;

use crate::domain::FutureId;
use crate::error::BoxError;
use crate::task::Task;

/// Counts calls; optionally fails, panics or sleeps in `handle`.
///
/// Every finished future adds a permit to `done`, so tests can wait for an
/// exact number of callbacks.
pub struct CountingTask {
    name: String,
    fail: bool,
    panic: bool,
    delay: Duration,
    pub handled: AtomicUsize,
    pub successes: AtomicUsize,
    pub failures: AtomicUsize,
    pub done: Semaphore,
    pub last_params: std::sync::Mutex<Vec<u8>>,
}

impl CountingTask {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            fail: false,
            panic: false,
            delay: Duration::ZERO,
            handled: AtomicUsize::new(0),
            successes: AtomicUsize::new(0),
            failures: AtomicUsize::new(0),
            done: Semaphore::new(0),
            last_params: std::sync::Mutex::new(Vec::new()),
        }
    }

    pub fn arc(name: &str) -> Arc<Self> {
        Arc::new(Self::new(name))
    }

    pub fn failing(name: &str) -> Arc<Self> {
        Arc::new(Self {
            fail: true,
            ..Self::new(name)
        })
    }

    pub fn panicking(name: &str) -> Arc<Self> {
        Arc::new(Self {
            panic: true,
            ..Self::new(name)
        })
    }

    pub fn slow(name: &str, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            delay,
            ..Self::new(name)
        })
    }

    pub fn successes(&self) -> usize {
        self.successes.load(Ordering::SeqCst)
    }

    pub fn failures(&self) -> usize {
        self.failures.load(Ordering::SeqCst)
    }

    pub fn handled(&self) -> usize {
        self.handled.load(Ordering::SeqCst)
    }

    /// Wait until `n` futures have finished (success or failure).
    pub async fn wait_for(&self, n: u32) {
        self.done.acquire_many(n).await.unwrap().forget();
    }
}

#[async_trait]
impl Task for CountingTask {
    fn name(&self) -> &str {
        &self.name
    }

    async fn handle(&self, _id: FutureId, params: &[u8]) -> Result<(), BoxError> {
        self.handled.fetch_add(1, Ordering::SeqCst);
        *self.last_params.lock().unwrap() = params.to_vec();
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if self.panic {
            panic!("boom");
        }
        if self.fail {
            return Err("whoops!".into());
        }
        Ok(())
    }

    async fn on_success(&self, _id: FutureId, _params: &[u8]) {
        self.successes.fetch_add(1, Ordering::SeqCst);
        self.done.add_permits(1);
    }

    async fn on_failure(&self, _id: FutureId, _err: &BoxError, _params: &[u8]) {
        self.failures.fetch_add(1, Ordering::SeqCst);
        self.done.add_permits(1);
    }
}
