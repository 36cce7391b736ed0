//! Bounded FIFO hand-off between producers and workers.
//!
//! Backed by a tokio `mpsc` channel. The receiver sits behind a mutex so that
//! any number of workers can pop; whichever worker holds the lock waits for
//! the next future, the rest wait for the lock.
//!
//! Closing happens in two steps:
//! 1. `closing` is cancelled: new pushes fail and pushes blocked on a full
//!    queue are woken with an error.
//! 2. Once every in-flight push has left the gate, `sealed` is cancelled:
//!    from then on `pop` returns `None` as soon as the queue is empty.

use tokio::sync::{Mutex, RwLock, mpsc};
use tokio_util::sync::CancellationToken;

use crate::domain::Future;
use crate::error::RadishError;

pub struct TaskQueue {
    tx: mpsc::Sender<Future>,
    rx: Mutex<mpsc::Receiver<Future>>,
    capacity: usize,
    // pushes hold a read guard; close() takes the write side to wait them out
    gate: RwLock<()>,
    closing: CancellationToken,
    sealed: CancellationToken,
}

impl TaskQueue {
    /// `capacity` is clamped to at least 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (tx, rx) = mpsc::channel(capacity);
        Self {
            tx,
            rx: Mutex::new(rx),
            capacity,
            gate: RwLock::new(()),
            closing: CancellationToken::new(),
            sealed: CancellationToken::new(),
        }
    }

    /// Append `future`, waiting for a free slot while the queue is full.
    ///
    /// Fails only if the queue is (or gets) closed before the future is in.
    pub async fn push(&self, future: Future) -> Result<(), RadishError> {
        if self.closing.is_cancelled() {
            return Err(RadishError::queue_closed());
        }

        let _gate = self.gate.read().await;
        tokio::select! {
            biased;
            _ = self.closing.cancelled() => Err(RadishError::queue_closed()),
            sent = self.tx.send(future) => sent.map_err(|_| RadishError::queue_closed()),
        }
    }

    /// Next future in FIFO order.
    ///
    /// Waits while the queue is empty. Returns `None` only once the queue has
    /// been closed and everything pushed before that has been taken.
    /// Cancel-safe: dropping the call never loses a future.
    pub async fn pop(&self) -> Option<Future> {
        let mut rx = self.rx.lock().await;
        let received = tokio::select! {
            biased;
            future = rx.recv() => Some(future),
            _ = self.sealed.cancelled() => None,
        };

        match received {
            Some(future) => future,
            None => rx.try_recv().ok(),
        }
    }

    /// Stop accepting futures. Already queued futures can still be popped.
    pub async fn close(&self) {
        self.closing.cancel();
        let _gate = self.gate.write().await;
        self.sealed.cancel();
    }

    pub fn is_closed(&self) -> bool {
        self.closing.is_cancelled()
    }

    /// Number of futures waiting to be picked up.
    pub fn len(&self) -> usize {
        self.tx.max_capacity() - self.tx.capacity()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
