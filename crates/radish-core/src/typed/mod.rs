//! Typed - 型付き Task API
//!
//! 生のバイト列の代わりに serde の型でペイロードを扱います。
//!
//! # 二層構造
//! - **表層（Typed）**: `JsonTask` trait - 型安全
//! - **内部（Dyn）**: `Json<T>` が `Task` を実装 - object-safe, type erasure
//!
//! ペイロードは JSON。空のペイロードは `null` として読む。

pub mod codec;
pub mod handler;
pub mod task;

pub use self::codec::CodecError;
pub use self::handler::Json;
pub use self::task::JsonTask;

use crate::app::Radish;
use crate::domain::FutureId;
use crate::error::{ErrorCode, RadishError};

/// Encode the payloads of `T` and enqueue one invocation of it.
///
/// `None` callbacks are sent as empty payloads. Encoding failures are
/// reported as `ErrorCode::Unknown`; everything else is `Radish::delay`.
pub async fn delay<T: JsonTask>(
    radish: &Radish,
    params: &T::Params,
    success: Option<&T::Success>,
    failure: Option<&T::Failure>,
) -> Result<FutureId, RadishError> {
    let encoded = codec::encode(params).and_then(|params| {
        Ok((
            params,
            codec::encode_opt(success)?,
            codec::encode_opt(failure)?,
        ))
    });
    let (params, success, failure) =
        encoded.map_err(|e| RadishError::new(ErrorCode::Unknown, e.to_string()))?;

    radish.delay(T::NAME, params, success, failure).await
}
