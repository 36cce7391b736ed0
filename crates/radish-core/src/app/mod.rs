//! App - アプリケーション層
//!
//! registry / queue / worker を組み合わせて Radish 本体を構成します。
//!
//! # 主要コンポーネント
//! - **Radish**: delay、スケーリング、shutdown の表面
//! - **RadishBuilder**: 構築とワイヤリング（起動時検証）
//! - **Status**: 状態のスナップショット

pub mod builder;
pub mod radish;
pub mod status;

pub use self::builder::RadishBuilder;
pub use self::radish::Radish;
pub use self::status::Status;
