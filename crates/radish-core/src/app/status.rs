//! Status - 現在の状態のスナップショット

use serde::{Deserialize, Serialize};

/// Point-in-time view of a running core, as returned by `Radish::status`.
///
/// Each field is read separately, so under concurrent scaling or enqueueing
/// the values need not agree with each other exactly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
    pub workers: usize,
    /// Futures waiting in the queue.
    pub queue: usize,
    pub capacity: usize,
    /// Registered task names, sorted.
    pub tasks: Vec<String>,
}

impl Status {
    pub fn percent_full(&self) -> f64 {
        crate::ports::metrics::percent_full(self.queue, self.capacity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_as_flat_object() {
        let status = Status {
            workers: 2,
            queue: 1,
            capacity: 4,
            tasks: vec!["long".to_string(), "short".to_string()],
        };
        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "workers": 2,
                "queue": 1,
                "capacity": 4,
                "tasks": ["long", "short"],
            })
        );
        assert_eq!(status.percent_full(), 25.0);
    }
}
