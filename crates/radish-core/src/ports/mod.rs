//! Ports - 抽象化レイヤー
//!
//! 差し替え可能な外部依存（時刻、ID 生成、メトリクス）を trait で定義します。
//! 実装は `impls` にあります（NoopMetrics と SystemClock はここに置く）。

pub mod clock;
pub mod id_generator;
pub mod metrics;

pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::id_generator::{IdGenerator, RandomIdGenerator, UlidGenerator};
pub use self::metrics::{Metrics, NoopMetrics, Outcome};
