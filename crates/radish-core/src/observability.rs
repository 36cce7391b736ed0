//! Log throttling for noisy, repeated warnings.
//!
//! A task that keeps failing would otherwise flood the log with one warning
//! per future. `Caution` lets the first warning for a key through, then one
//! more every `threshold` occurrences, reporting how many were held back.
//! Keys are task names, so memory is bounded by the registry size.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

pub struct Caution {
    threshold: u32,
    suppressed: Mutex<HashMap<String, u32>>,
}

impl Caution {
    /// `threshold` is clamped to at least 1 (every message logged).
    pub fn new(threshold: u32) -> Self {
        Self {
            threshold: threshold.max(1),
            suppressed: Mutex::new(HashMap::new()),
        }
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    /// Record one occurrence for `key`.
    ///
    /// Returns `Some(n)` if this occurrence should be logged, `n` being the
    /// number swallowed since the previous one; `None` to stay quiet.
    pub fn check(&self, key: &str) -> Option<u32> {
        let mut suppressed = self
            .suppressed
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let Some(count) = suppressed.get_mut(key) else {
            suppressed.insert(key.to_string(), 0);
            return Some(0);
        };

        *count += 1;
        if *count >= self.threshold {
            let held_back = *count - 1;
            *count = 0;
            return Some(held_back);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_then_every_threshold() {
        let caution = Caution::new(3);
        let logged: Vec<Option<u32>> = (0..8).map(|_| caution.check("bad")).collect();
        assert_eq!(
            logged,
            vec![Some(0), None, None, Some(2), None, None, Some(2), None]
        );
    }

    #[test]
    fn keys_are_independent() {
        let caution = Caution::new(10);
        assert_eq!(caution.check("a"), Some(0));
        assert_eq!(caution.check("b"), Some(0));
        assert_eq!(caution.check("a"), None);
    }

    #[test]
    fn threshold_one_logs_everything() {
        let caution = Caution::new(0);
        assert_eq!(caution.threshold(), 1);
        for _ in 0..4 {
            assert_eq!(caution.check("x"), Some(0));
        }
    }
}
