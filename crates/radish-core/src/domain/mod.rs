//! Domain model: future identifiers and the future record itself.

pub mod future;
pub mod ids;

pub use self::future::Future;
pub use self::ids::FutureId;
