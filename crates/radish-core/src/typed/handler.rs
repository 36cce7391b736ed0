//! Json<T> - JsonTask を `Task` に変換するアダプタ
//!
//! # 学習ポイント
//! - Type erasure パターン (Json<T> → Arc<dyn Task>)
//! - デコード失敗の扱い（params は on_failure へ、callback は None へ）

use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::warn;

use super::codec;
use super::task::JsonTask;
use crate::domain::FutureId;
use crate::error::BoxError;
use crate::task::Task;

/// Json は JsonTask を object-safe な `Task` として登録可能にする
pub struct Json<T>(T);

impl<T: JsonTask> Json<T> {
    pub fn new(task: T) -> Self {
        Self(task)
    }

    /// `Radish::register` にそのまま渡せる形
    pub fn arc(task: T) -> Arc<dyn Task> {
        Arc::new(Self(task))
    }

    pub fn inner(&self) -> &T {
        &self.0
    }
}

/// Callback payloads are best effort: an undecodable one is logged and
/// dropped so the callback still runs.
fn decode_callback<P: DeserializeOwned>(task: &str, id: FutureId, bytes: &[u8]) -> Option<P> {
    match codec::decode(bytes) {
        Ok(payload) => Some(payload),
        Err(_) if bytes.is_empty() => None,
        Err(e) => {
            warn!(task, %id, error = %e, "could not decode callback payload");
            None
        }
    }
}

#[async_trait]
impl<T: JsonTask> Task for Json<T> {
    fn name(&self) -> &str {
        T::NAME
    }

    async fn handle(&self, id: FutureId, params: &[u8]) -> Result<(), BoxError> {
        let params: T::Params = codec::decode(params)?;
        self.0.handle(id, params).await
    }

    async fn on_success(&self, id: FutureId, params: &[u8]) {
        let payload = decode_callback::<T::Success>(T::NAME, id, params);
        self.0.on_success(id, payload).await;
    }

    async fn on_failure(&self, id: FutureId, err: &BoxError, params: &[u8]) {
        let payload = decode_callback::<T::Failure>(T::NAME, id, params);
        self.0.on_failure(id, err, payload).await;
    }
}
