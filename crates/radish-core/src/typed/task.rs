//! JsonTask trait - 型付き Task の定義
//!
//! # 学習ポイント
//! - Associated Constants (`const NAME`)
//! - Associated Types でペイロードの型を固定
//! - Trait bounds の組み合わせ (Serialize + DeserializeOwned + Send + Sync)

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::domain::FutureId;
use crate::error::BoxError;

/// JsonTask は task 名とペイロードの型を対応付ける
///
/// `Json<T>` で包むと `Task` として登録できる。ペイロードは JSON で運ばれる。
///
/// # 使用例
/// ```ignore
/// struct SendEmail;
///
/// #[async_trait]
/// impl JsonTask for SendEmail {
///     const NAME: &'static str = "email";
///     type Params = Email;
///     type Success = ();
///     type Failure = String;
///
///     async fn handle(&self, _id: FutureId, email: Email) -> Result<(), BoxError> {
///         send(email).await
///     }
/// }
///
/// radish.register(Json::arc(SendEmail))?;
/// typed::delay::<SendEmail>(&radish, &email, None, Some(&"bounce".to_string())).await?;
/// ```
///
/// # Trait Bounds
/// - `Serialize`: delay 時のエンコードのため
/// - `DeserializeOwned`: worker 側でのデコードのため
/// - `Send + Sync`: worker 間で共有されるため
#[async_trait]
pub trait JsonTask: Send + Sync + 'static {
    /// 登録名
    const NAME: &'static str;

    type Params: Serialize + DeserializeOwned + Send + Sync;
    type Success: Serialize + DeserializeOwned + Send + Sync;
    type Failure: Serialize + DeserializeOwned + Send + Sync;

    async fn handle(&self, id: FutureId, params: Self::Params) -> Result<(), BoxError>;

    /// `payload` は delay 時に渡された success ペイロード。無いかデコードできなければ `None`。
    async fn on_success(&self, _id: FutureId, _payload: Option<Self::Success>) {}

    /// params のデコード失敗もここに来る。
    async fn on_failure(&self, _id: FutureId, _err: &BoxError, _payload: Option<Self::Failure>) {}
}
