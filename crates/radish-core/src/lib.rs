//! radish-core
//!
//! Stateless in-process asynchronous task queue.
//!
//! Producers enqueue named invocations (`Radish::delay`) carrying opaque
//! payloads; a pool of workers drains the bounded queue and dispatches each
//! future to the task registered under its name, then to the task's success
//! or failure callback. The pool can be resized at runtime, and `shutdown`
//! drains what is queued before stopping the workers.
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（FutureId, Future）
//! - **ports**: 抽象化レイヤー（Clock, IdGenerator, Metrics）
//! - **impls**: 実装（InMemoryMetrics）
//! - **app**: Radish 本体、RadishBuilder、Status
//! - **typed**: 型付き Task API（JsonTask, Json<T>）
//! - registry / queue / worker: 内部の構成要素

pub mod app;
pub mod config;
pub mod domain;
pub mod error;
pub mod impls;
pub mod observability;
pub mod ports;
pub mod queue;
pub mod registry;
pub mod task;
pub mod typed;

mod worker;

#[cfg(test)]
mod testing;

pub use crate::app::{Radish, RadishBuilder, Status};
pub use crate::config::{Config, LogLevel, Settings};
pub use crate::domain::FutureId;
pub use crate::error::{ApiError, BoxError, ErrorCode, RadishError};
pub use crate::task::Task;
