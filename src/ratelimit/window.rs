//! Fixed window counter

use chrono::Utc;

/// Counts requests inside one fixed time window.
///
/// The window starts at the first request and is replaced by a fresh one
/// when a request arrives after it has elapsed.
#[derive(Debug, Clone)]
pub struct FixedWindow {
    /// Window start (Unix milliseconds)
    started_at: i64,
    /// Requests counted in the current window
    count: u32,
}

impl FixedWindow {
    pub fn new(now: i64) -> Self {
        Self {
            started_at: now,
            count: 0,
        }
    }

    /// Get current time in milliseconds
    pub fn now_millis() -> i64 {
        Utc::now().timestamp_millis()
    }

    /// Count one request at `now`. Returns false when the window is full.
    pub fn try_hit(&mut self, now: i64, max: u32, window_ms: i64) -> bool {
        if self.is_expired(now, window_ms) {
            self.started_at = now;
            self.count = 0;
        }

        if self.count >= max {
            return false;
        }

        self.count += 1;
        true
    }

    pub fn is_expired(&self, now: i64, window_ms: i64) -> bool {
        now - self.started_at >= window_ms
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    /// When the current window ends (Unix milliseconds)
    pub fn resets_at(&self, window_ms: i64) -> i64 {
        self.started_at + window_ms
    }

    /// Whole seconds until the window ends, at least 1
    pub fn retry_after(&self, now: i64, window_ms: i64) -> u64 {
        let remaining_ms = (self.resets_at(window_ms) - now).max(0) as u64;
        remaining_ms.div_ceil(1000).max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_fills_up() {
        let mut window = FixedWindow::new(0);

        for _ in 0..3 {
            assert!(window.try_hit(10, 3, 1_000));
        }
        assert!(!window.try_hit(20, 3, 1_000));
        assert_eq!(window.count(), 3);
    }

    #[test]
    fn test_window_resets_after_elapsed() {
        let mut window = FixedWindow::new(0);
        assert!(window.try_hit(0, 1, 1_000));
        assert!(!window.try_hit(999, 1, 1_000));

        // Exactly one window later a new window begins
        assert!(window.try_hit(1_000, 1, 1_000));
        assert_eq!(window.resets_at(1_000), 2_000);
    }

    #[test]
    fn test_retry_after_rounds_up() {
        let window = FixedWindow::new(0);
        assert_eq!(window.retry_after(0, 900_000), 900);
        assert_eq!(window.retry_after(899_001, 900_000), 1);
        assert_eq!(window.retry_after(950_000, 900_000), 1);
    }
}
