use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Stable numeric error codes shared by the core and its adapters.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    Unknown = 0,
    InvalidConfig = 1,
    TaskAlreadyRegistered = 2,
    TaskNotRegistered = 3,
    NoWorkers = 4,
    InvalidWorkers = 5,
    /// Listen failures in network adapters; never produced by the core itself.
    BadGateway = 6,
    /// The queue was closed by `shutdown`.
    QueueClosed = 7,
}

impl ErrorCode {
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Unrecognised codes map to `Unknown`.
    pub fn from_i32(code: i32) -> Self {
        match code {
            1 => Self::InvalidConfig,
            2 => Self::TaskAlreadyRegistered,
            3 => Self::TaskNotRegistered,
            4 => Self::NoWorkers,
            5 => Self::InvalidWorkers,
            6 => Self::BadGateway,
            7 => Self::QueueClosed,
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_i32())
    }
}

/// Every failure surfaced by the core: a code plus free text.
///
/// Rendered as `"[<code>] <message>"`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("[{code}] {message}")]
pub struct RadishError {
    code: ErrorCode,
    message: String,
}

impl RadishError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub(crate) fn invalid_workers(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidWorkers, message)
    }

    pub(crate) fn not_registered(task: &str) -> Self {
        Self::new(ErrorCode::TaskNotRegistered, format!("unknown task {task:?}"))
    }

    pub(crate) fn queue_closed() -> Self {
        Self::new(ErrorCode::QueueClosed, "radish has been shut down")
    }
}

/// Wire form of [`RadishError`] used by transport adapters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    pub code: i32,
    pub message: String,
}

impl From<&RadishError> for ApiError {
    fn from(err: &RadishError) -> Self {
        Self {
            code: err.code.as_i32(),
            message: err.message.clone(),
        }
    }
}

impl From<RadishError> for ApiError {
    fn from(err: RadishError) -> Self {
        Self {
            code: err.code.as_i32(),
            message: err.message,
        }
    }
}

impl From<ApiError> for RadishError {
    fn from(err: ApiError) -> Self {
        Self::new(ErrorCode::from_i32(err.code), err.message)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

/// Error type returned by task handlers.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_numeric_code() {
        let err = RadishError::invalid_workers("cannot set number of workers <0");
        assert_eq!(err.to_string(), "[5] cannot set number of workers <0");
        assert_eq!(err.code(), ErrorCode::InvalidWorkers);
    }

    #[test]
    fn api_error_keeps_code_and_message() {
        let err = RadishError::not_registered("email");
        let api = ApiError::from(&err);
        assert_eq!(api.code, 3);
        assert_eq!(api.message, "unknown task \"email\"");
        assert_eq!(api.to_string(), err.to_string());

        let json = serde_json::to_value(&api).unwrap();
        assert_eq!(json, serde_json::json!({"code": 3, "message": "unknown task \"email\""}));

        let back: RadishError = api.into();
        assert_eq!(back, err);
    }

    #[test]
    fn unknown_codes_fall_back() {
        assert_eq!(ErrorCode::from_i32(42), ErrorCode::Unknown);
        assert_eq!(ErrorCode::from_i32(7), ErrorCode::QueueClosed);
    }
}
