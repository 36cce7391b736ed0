//! Runtime options for a [`Radish`](crate::Radish) instance.
//!
//! `Config` is what callers fill in (or deserialize); [`Config::validate`]
//! populates defaults for zero values and returns the immutable [`Settings`]
//! the core is built from.

use std::fmt;
use std::num::NonZeroUsize;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::level_filters::LevelFilter;

use crate::error::{ErrorCode, RadishError};

/// Queue capacity used when none is configured.
pub const DEFAULT_QUEUE_SIZE: usize = 5000;

/// Repeated handler failures per task are logged once every this many.
pub const DEFAULT_CAUTION_THRESHOLD: u32 = 50;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Workers to start with; `<= 0` means the host's available parallelism.
    pub workers: i64,
    /// Capacity of the task queue; `<= 0` means [`DEFAULT_QUEUE_SIZE`].
    pub queue_size: i64,
    /// trace, debug, info, status, warn or silent (empty means info).
    pub log_level: String,
    /// `0` means [`DEFAULT_CAUTION_THRESHOLD`].
    pub caution_threshold: u32,
    /// Report to a no-op metrics sink unless one is injected explicitly.
    pub suppress_metrics: bool,
}

impl Config {
    pub fn validate(&self) -> Result<Settings, RadishError> {
        let workers = if self.workers <= 0 {
            available_parallelism()
        } else {
            self.workers as usize
        };

        let queue_size = if self.queue_size <= 0 {
            DEFAULT_QUEUE_SIZE
        } else {
            self.queue_size as usize
        };

        let log_level = if self.log_level.is_empty() {
            LogLevel::Info
        } else {
            self.log_level.parse()?
        };

        let caution_threshold = if self.caution_threshold == 0 {
            DEFAULT_CAUTION_THRESHOLD
        } else {
            self.caution_threshold
        };

        Ok(Settings {
            workers,
            queue_size,
            log_level,
            caution_threshold,
            suppress_metrics: self.suppress_metrics,
        })
    }
}

fn available_parallelism() -> usize {
    std::thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
}

/// Validated configuration. Immutable once the core is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Settings {
    pub workers: usize,
    pub queue_size: usize,
    pub log_level: LogLevel,
    pub caution_threshold: u32,
    pub suppress_metrics: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Status,
    Warn,
    Silent,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Status => "status",
            Self::Warn => "warn",
            Self::Silent => "silent",
        }
    }

    /// `status` has no tracing counterpart and shares INFO.
    pub fn as_filter(self) -> LevelFilter {
        match self {
            Self::Trace => LevelFilter::TRACE,
            Self::Debug => LevelFilter::DEBUG,
            Self::Info | Self::Status => LevelFilter::INFO,
            Self::Warn => LevelFilter::WARN,
            Self::Silent => LevelFilter::OFF,
        }
    }
}

impl FromStr for LogLevel {
    type Err = RadishError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(Self::Trace),
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "status" => Ok(Self::Status),
            "warn" => Ok(Self::Warn),
            "silent" => Ok(Self::Silent),
            _ => Err(RadishError::new(
                ErrorCode::InvalidConfig,
                format!(
                    "{s:?} is an invalid log level, use trace, debug, info, status, warn, or silent"
                ),
            )),
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_values_get_defaults() {
        let settings = Config::default().validate().unwrap();
        assert_eq!(settings.workers, available_parallelism());
        assert!(settings.workers >= 1);
        assert_eq!(settings.queue_size, DEFAULT_QUEUE_SIZE);
        assert_eq!(settings.log_level, LogLevel::Info);
        assert_eq!(settings.caution_threshold, DEFAULT_CAUTION_THRESHOLD);
        assert!(!settings.suppress_metrics);
    }

    #[test]
    fn negative_values_get_defaults() {
        let config = Config {
            workers: -3,
            queue_size: -1,
            ..Config::default()
        };
        let settings = config.validate().unwrap();
        assert_eq!(settings.workers, available_parallelism());
        assert_eq!(settings.queue_size, DEFAULT_QUEUE_SIZE);
    }

    #[test]
    fn explicit_values_are_kept() {
        let config = Config {
            workers: 7,
            queue_size: 12,
            log_level: "WARN".to_string(),
            caution_threshold: 3,
            suppress_metrics: true,
        };
        let settings = config.validate().unwrap();
        assert_eq!(settings.workers, 7);
        assert_eq!(settings.queue_size, 12);
        assert_eq!(settings.log_level, LogLevel::Warn);
        assert_eq!(settings.caution_threshold, 3);
        assert!(settings.suppress_metrics);
    }

    #[test]
    fn unknown_log_level_is_invalid_config() {
        let config = Config {
            log_level: "loud".to_string(),
            ..Config::default()
        };
        let err = config.validate().unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidConfig);
        assert_eq!(
            err.to_string(),
            "[1] \"loud\" is an invalid log level, use trace, debug, info, status, warn, or silent"
        );
    }

    #[test]
    fn log_levels_map_to_filters() {
        assert_eq!(LogLevel::Trace.as_filter(), LevelFilter::TRACE);
        assert_eq!(LogLevel::Status.as_filter(), LevelFilter::INFO);
        assert_eq!(LogLevel::Silent.as_filter(), LevelFilter::OFF);
        assert_eq!("Debug".parse::<LogLevel>().unwrap(), LogLevel::Debug);
    }

    #[test]
    fn deserializes_with_missing_fields() {
        let config: Config = serde_json::from_str(r#"{"workers": 2}"#).unwrap();
        assert_eq!(config.workers, 2);
        assert_eq!(config.queue_size, 0);
        assert!(config.log_level.is_empty());
    }
}
