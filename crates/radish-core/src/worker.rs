use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use futures::FutureExt;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, trace, warn};

use crate::app::radish::Shared;
use crate::domain::Future;
use crate::ports::Outcome;

/// Handle to one running worker.
///
/// Dropping the handle signals the worker to stop but does not wait for it.
pub(crate) struct WorkerHandle {
    id: u64,
    stop: CancellationToken,
    join: Option<JoinHandle<()>>,
}

impl WorkerHandle {
    pub(crate) fn spawn(id: u64, shared: Arc<Shared>) -> Self {
        let stop = CancellationToken::new();
        let worker = Worker {
            id,
            shared,
            stop: stop.clone(),
        };
        let join = tokio::spawn(worker.run());

        Self {
            id,
            stop,
            join: Some(join),
        }
    }

    pub(crate) fn id(&self) -> u64 {
        self.id
    }

    /// Signal stop and wait until the worker has finished its in-flight task
    /// (if any) and left its loop.
    pub(crate) async fn stop(mut self) {
        self.stop.cancel();
        self.wait().await;
    }

    /// Wait for the worker to leave its loop on its own, which it does once
    /// the queue is closed and drained.
    pub(crate) async fn join(mut self) {
        self.wait().await;
    }

    async fn wait(&mut self) {
        if let Some(join) = self.join.take()
            && let Err(e) = join.await
        {
            error!(worker = self.id, error = %e, "worker exited abnormally");
        }
    }
}

impl Drop for WorkerHandle {
    fn drop(&mut self) {
        self.stop.cancel();
    }
}

struct Worker {
    id: u64,
    shared: Arc<Shared>,
    stop: CancellationToken,
}

impl Worker {
    async fn run(self) {
        debug!(worker = self.id, "worker started");

        loop {
            // stop は待機中にしか見ない: 実行中のタスクは中断しない
            let future = tokio::select! {
                biased;
                _ = self.stop.cancelled() => break,
                future = self.shared.queue.pop() => future,
            };

            let Some(future) = future else {
                // queue closed and drained
                break;
            };

            self.shared.report_queue_depth();
            self.dispatch(future).await;
        }

        debug!(worker = self.id, "worker stopped");
    }

    async fn dispatch(&self, future: Future) {
        let id = future.id();
        let task = future.task();

        // The registry lock is released before the handler runs.
        let handler = match self.shared.registry.handler(task) {
            Ok(handler) => handler,
            Err(_) => {
                warn!(
                    worker = self.id,
                    task,
                    %id,
                    "cannot handle unregistered task, dropping future"
                );
                return;
            }
        };

        trace!(worker = self.id, task, %id, "handling task");
        let started = Instant::now();
        // panic は失敗として扱う: worker は生き残る
        let result = match AssertUnwindSafe(handler.handle(id, future.params()))
            .catch_unwind()
            .await
        {
            Ok(result) => result,
            Err(panic) => Err(format!("task panicked: {}", panic_message(&*panic)).into()),
        };
        let latency = started.elapsed();

        match result {
            Ok(()) => {
                debug!(worker = self.id, task, %id, ?latency, "finished task");
                let callback = AssertUnwindSafe(handler.on_success(id, future.success()));
                if let Err(panic) = callback.catch_unwind().await {
                    error!(
                        worker = self.id,
                        task,
                        %id,
                        panic = %panic_message(&*panic),
                        "success callback panicked"
                    );
                }
                self.shared
                    .metrics
                    .task_completed(task, Outcome::Success, latency);
            }
            Err(err) => {
                if let Some(suppressed) = self.shared.caution.check(task) {
                    warn!(worker = self.id, task, %id, error = %err, suppressed, "task failed");
                }
                let callback = AssertUnwindSafe(handler.on_failure(id, &err, future.failure()));
                if let Err(panic) = callback.catch_unwind().await {
                    error!(
                        worker = self.id,
                        task,
                        %id,
                        panic = %panic_message(&*panic),
                        "failure callback panicked"
                    );
                }
                self.shared
                    .metrics
                    .task_completed(task, Outcome::Failure, latency);
            }
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(msg) = panic.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
