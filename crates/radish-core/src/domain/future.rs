use super::FutureId;

/// One enqueued task invocation.
///
/// Created by `Radish::delay`, handed to exactly one worker, then dropped.
/// Payload interpretation belongs to the task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Future {
    id: FutureId,
    task: String,
    params: Vec<u8>,
    success: Vec<u8>,
    failure: Vec<u8>,
}

impl Future {
    pub fn new(
        id: FutureId,
        task: impl Into<String>,
        params: Vec<u8>,
        success: Vec<u8>,
        failure: Vec<u8>,
    ) -> Self {
        Self {
            id,
            task: task.into(),
            params,
            success,
            failure,
        }
    }

    pub fn id(&self) -> FutureId {
        self.id
    }

    /// Name of the registered task that handles this future.
    pub fn task(&self) -> &str {
        &self.task
    }

    pub fn params(&self) -> &[u8] {
        &self.params
    }

    /// Payload for `on_success`.
    pub fn success(&self) -> &[u8] {
        &self.success
    }

    /// Payload for `on_failure`.
    pub fn failure(&self) -> &[u8] {
        &self.failure
    }
}
