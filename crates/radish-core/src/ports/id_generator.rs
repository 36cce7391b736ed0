//! IdGenerator port - ID 生成の抽象化
//!
//! # 実装
//! - **RandomIdGenerator**: 128-bit すべてランダム（デフォルト）
//! - **UlidGenerator**: ULID ベース（時刻でソート可能）

use ulid::Ulid;

use crate::domain::FutureId;
use crate::ports::Clock;

/// IdGenerator produces the identifier handed back by `Radish::delay`.
///
/// Called concurrently by every producer, hence `Send + Sync`.
pub trait IdGenerator: Send + Sync {
    fn generate_future_id(&self) -> FutureId;
}

/// Fills all 128 bits from the thread-local RNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomIdGenerator;

impl IdGenerator for RandomIdGenerator {
    fn generate_future_id(&self) -> FutureId {
        FutureId::from_u128(rand::random())
    }
}

/// UlidGenerator は ULID ベースの ID 生成器
///
/// 48-bit のタイムスタンプは Clock から取得し、残り 80-bit はランダム。
/// テスト時に FixedClock を使えばタイムスタンプ部分が決定的になる。
pub struct UlidGenerator<C> {
    clock: C,
}

impl<C: Clock> UlidGenerator<C> {
    pub fn new(clock: C) -> Self {
        Self { clock }
    }
}

impl<C: Clock> IdGenerator for UlidGenerator<C> {
    fn generate_future_id(&self) -> FutureId {
        let timestamp_ms = self.clock.now().timestamp_millis() as u64;
        FutureId::from_ulid(Ulid::from_parts(timestamp_ms, rand::random()))
    }
}
