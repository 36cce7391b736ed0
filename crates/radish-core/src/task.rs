use async_trait::async_trait;

use crate::domain::FutureId;
use crate::error::BoxError;

/// A named unit of work registered with [`Radish`](crate::Radish).
///
/// One instance serves every future with this name, and several workers may
/// call into it at the same time: treat it like a shared service and keep any
/// per-invocation state inside the method bodies.
///
/// Payloads are opaque bytes in whatever format the task chooses; see
/// [`typed::Json`](crate::typed::Json) for a serde-based adapter.
#[async_trait]
pub trait Task: Send + Sync {
    /// Unique name, also the registry key.
    fn name(&self) -> &str;

    /// Do the work. An error is terminal for the future and is only reported
    /// to [`on_failure`](Task::on_failure); nothing is retried.
    async fn handle(&self, id: FutureId, params: &[u8]) -> Result<(), BoxError>;

    async fn on_success(&self, id: FutureId, params: &[u8]);

    async fn on_failure(&self, id: FutureId, err: &BoxError, params: &[u8]);
}
