//! Impls - ports の実装
//!
//! - **InMemoryMetrics**: プロセス内メトリクス（テスト・デモ用にも使う）

pub mod metrics;

pub use self::metrics::{Histogram, InMemoryMetrics, MetricsSnapshot, TaskSnapshot};
