//! Radish - the task queue core.
//!
//! Owns the registry, the queue and the live worker set. Producers call
//! [`Radish::delay`]; workers drain the queue and dispatch to registered
//! tasks; the scaling calls grow or shrink the worker set while all of that is
//! running.
//!
//! # Locking
//! - The registry has its own read/write lock, held for map access only.
//! - The worker set sits behind an async mutex. Every scaling call holds it for
//!   its whole read-then-act sequence, including the wait for removed workers
//!   to acknowledge their stop. Workers never touch this mutex, so a removal
//!   can always make progress.
//! - The queue is a channel and needs no extra lock.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::app::builder::RadishBuilder;
use crate::app::status::Status;
use crate::config::{Config, Settings};
use crate::domain::{Future, FutureId};
use crate::error::{ErrorCode, RadishError};
use crate::observability::Caution;
use crate::ports::{IdGenerator, Metrics};
use crate::queue::TaskQueue;
use crate::registry::Registry;
use crate::task::Task;
use crate::worker::WorkerHandle;

/// State shared between the core and every worker.
pub(crate) struct Shared {
    pub(crate) registry: Registry,
    pub(crate) queue: TaskQueue,
    pub(crate) metrics: Arc<dyn Metrics>,
    pub(crate) caution: Caution,
    pub(crate) ids: Arc<dyn IdGenerator>,
}

impl Shared {
    pub(crate) fn new(
        settings: &Settings,
        metrics: Arc<dyn Metrics>,
        ids: Arc<dyn IdGenerator>,
    ) -> Self {
        Self {
            registry: Registry::new(),
            queue: TaskQueue::new(settings.queue_size),
            metrics,
            caution: Caution::new(settings.caution_threshold),
            ids,
        }
    }

    pub(crate) fn report_queue_depth(&self) {
        self.metrics
            .queue_depth(self.queue.len(), self.queue.capacity());
    }

    #[cfg(test)]
    pub(crate) fn for_test(queue_size: usize, metrics: Arc<dyn Metrics>) -> Self {
        Self {
            registry: Registry::new(),
            queue: TaskQueue::new(queue_size),
            metrics,
            caution: Caution::new(1),
            ids: Arc::new(crate::ports::RandomIdGenerator),
        }
    }
}

/// Live workers, oldest first.
#[derive(Default)]
struct WorkerSet {
    workers: Vec<WorkerHandle>,
    next_id: u64,
}

impl WorkerSet {
    fn len(&self) -> usize {
        self.workers.len()
    }
}

/// A stateless asynchronous task queue.
///
/// Cheap to clone; clones share the same queue, registry and workers. When
/// the last clone is dropped the workers are signalled to stop; call
/// [`shutdown`](Radish::shutdown) to drain the queue first.
#[derive(Clone)]
pub struct Radish {
    inner: Arc<Inner>,
}

struct Inner {
    settings: Settings,
    shared: Arc<Shared>,
    workers: Mutex<WorkerSet>,
}

impl Radish {
    /// Validate `config`, register `tasks` and start the configured number of
    /// workers.
    pub async fn new(config: Config, tasks: Vec<Arc<dyn Task>>) -> Result<Self, RadishError> {
        tasks
            .into_iter()
            .fold(RadishBuilder::new(config), RadishBuilder::register)
            .build()
            .await
    }

    pub fn builder(config: Config) -> RadishBuilder {
        RadishBuilder::new(config)
    }

    /// Build without starting workers; the builder calls `add_workers`.
    pub(crate) fn from_parts(settings: Settings, shared: Shared) -> Self {
        Self {
            inner: Arc::new(Inner {
                settings,
                shared: Arc::new(shared),
                workers: Mutex::new(WorkerSet::default()),
            }),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.inner.settings
    }

    /// Register a task handler. Names are permanent: a second registration
    /// under the same name fails with `TaskAlreadyRegistered`.
    pub fn register(&self, task: Arc<dyn Task>) -> Result<(), RadishError> {
        let name = task.name().to_string();
        self.inner.shared.registry.register(task)?;
        debug!(task = %name, "registered task");
        Ok(())
    }

    /// Look up the handler registered under `task`.
    pub fn handler(&self, task: &str) -> Result<Arc<dyn Task>, RadishError> {
        self.inner.shared.registry.handler(task)
    }

    /// Enqueue one invocation of `task` and return its id.
    ///
    /// Waits while the queue is full. Fails with `TaskNotRegistered` (nothing
    /// is queued) or, after [`shutdown`](Radish::shutdown), `QueueClosed`.
    pub async fn delay(
        &self,
        task: &str,
        params: impl Into<Vec<u8>>,
        success: impl Into<Vec<u8>>,
        failure: impl Into<Vec<u8>>,
    ) -> Result<FutureId, RadishError> {
        let shared = &self.inner.shared;
        if let Err(err) = shared.registry.handler(task) {
            return Err(RadishError::new(
                ErrorCode::TaskNotRegistered,
                format!("could not delay {}", err.message()),
            ));
        }

        let id = shared.ids.generate_future_id();
        let future = Future::new(id, task, params.into(), success.into(), failure.into());
        shared.queue.push(future).await?;
        shared.report_queue_depth();

        Ok(id)
    }

    /// Scale to exactly `n` workers. A no-op when already there.
    pub async fn set_workers(&self, n: i64) -> Result<(), RadishError> {
        if n < 0 {
            return Err(RadishError::invalid_workers(
                "cannot set number of workers <0",
            ));
        }

        let mut workers = self.inner.workers.lock().await;
        let current = workers.len() as i64;
        if n > current {
            return self.add_locked(&mut workers, n - current);
        }
        if n < current {
            return self.remove_locked(&mut workers, current - n).await;
        }
        Ok(())
    }

    /// Start `n` more workers.
    pub async fn add_workers(&self, n: i64) -> Result<(), RadishError> {
        let mut workers = self.inner.workers.lock().await;
        self.add_locked(&mut workers, n)
    }

    /// Stop the `n` most recently added workers, waiting for each to finish
    /// its current task. All or nothing: asking for more workers than are
    /// running changes nothing.
    pub async fn remove_workers(&self, n: i64) -> Result<(), RadishError> {
        let mut workers = self.inner.workers.lock().await;
        self.remove_locked(&mut workers, n).await
    }

    pub async fn num_workers(&self) -> usize {
        self.inner.workers.lock().await.len()
    }

    /// Futures waiting in the queue.
    pub fn queue_len(&self) -> usize {
        self.inner.shared.queue.len()
    }

    pub async fn status(&self) -> Status {
        let shared = &self.inner.shared;
        Status {
            workers: self.num_workers().await,
            queue: shared.queue.len(),
            capacity: shared.queue.capacity(),
            tasks: shared.registry.names(),
        }
    }

    /// Stop accepting futures, let the workers finish everything already
    /// queued, then stop them.
    ///
    /// Blocked and later `delay` calls fail with `QueueClosed`, as do later
    /// attempts to add workers. Calling it again is a no-op.
    pub async fn shutdown(&self) {
        let shared = &self.inner.shared;
        shared.queue.close().await;

        let mut workers = self.inner.workers.lock().await;
        if workers.workers.is_empty() {
            if !shared.queue.is_empty() {
                warn!(
                    undrained = shared.queue.len(),
                    "no workers left, queued futures will not run"
                );
            }
        } else {
            info!(
                workers = workers.len(),
                queued = shared.queue.len(),
                "shutting down, draining queue"
            );
        }
        // workers leave their loop by themselves once the queue is drained
        while let Some(worker) = workers.workers.pop() {
            worker.join().await;
        }
        shared.metrics.workers(0);
        info!("shutdown complete");
    }

    fn add_locked(&self, workers: &mut WorkerSet, n: i64) -> Result<(), RadishError> {
        if n == 0 {
            return Ok(());
        } else if n < 0 {
            return Err(RadishError::invalid_workers(
                "cannot add negative workers, use remove_workers",
            ));
        }

        let shared = &self.inner.shared;
        if shared.queue.is_closed() {
            return Err(RadishError::queue_closed());
        }

        for _ in 0..n {
            let id = workers.next_id;
            workers.next_id += 1;
            workers
                .workers
                .push(WorkerHandle::spawn(id, Arc::clone(shared)));
        }

        shared.metrics.workers(workers.len());
        info!(added = n, workers = workers.len(), "added workers");
        Ok(())
    }

    async fn remove_locked(&self, workers: &mut WorkerSet, n: i64) -> Result<(), RadishError> {
        let running = workers.len();
        if n > running as i64 {
            return Err(RadishError::invalid_workers(format!(
                "cannot remove {n} workers, only {running} currently running"
            )));
        } else if n == 0 {
            return Ok(());
        } else if n < 0 {
            return Err(RadishError::invalid_workers(
                "cannot remove negative workers, use add_workers",
            ));
        }

        let shared = &self.inner.shared;
        for _ in 0..n {
            // most recently added first
            if let Some(worker) = workers.workers.pop() {
                worker.stop().await;
                shared.metrics.workers(workers.len());
            }
        }

        info!(removed = n, workers = workers.len(), "removed workers");
        Ok(())
    }
}
