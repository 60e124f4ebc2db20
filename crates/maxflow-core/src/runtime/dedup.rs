//! Duplicate callback suppression.
//!
//! Messengers redeliver callback presses on flaky connections and users
//! double-tap buttons. Presses of the same payload by the same user inside
//! the window are dropped. Time comes from the event timestamps themselves,
//! so replayed batches dedup the same way live traffic does.

use parking_lot::Mutex;
use std::collections::HashMap;

pub const DEFAULT_WINDOW_MS: i64 = 2_000;

/// Entries older than this are evicted on insert.
const PRUNE_HORIZON_MS: i64 = 10_000;

pub struct DedupCache {
    window_ms: i64,
    seen: Mutex<HashMap<(String, String), i64>>,
}

impl DedupCache {
    pub fn new(window_ms: i64) -> Self {
        Self {
            window_ms,
            seen: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_default_window() -> Self {
        Self::new(DEFAULT_WINDOW_MS)
    }

    /// Record a press and report whether it should be processed.
    ///
    /// Returns `false` for a duplicate inside the window. Events without a
    /// user id or payload always pass.
    pub fn check(&self, user_id: &str, payload: &str, timestamp_ms: i64) -> bool {
        if user_id.is_empty() || payload.is_empty() {
            return true;
        }

        let key = (user_id.to_string(), payload.to_string());
        let mut seen = self.seen.lock();
        if let Some(&previous) = seen.get(&key) {
            if timestamp_ms - previous < self.window_ms {
                return false;
            }
        }
        seen.insert(key, timestamp_ms);
        seen.retain(|_, &mut recorded| timestamp_ms - recorded <= PRUNE_HORIZON_MS);
        true
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.seen.lock().len()
    }
}
