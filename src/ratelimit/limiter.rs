//! Local rate limiter implementation

use dashmap::DashMap;
use serde::Serialize;

use super::config::RateLimitConfig;
use super::window::FixedWindow;

/// Result of a rate limit check
#[derive(Debug, Clone)]
pub enum RateLimitResult {
    /// Request is allowed
    Allowed {
        remaining: u32,
        limit: u32,
        reset_at: i64,
    },
    /// Request is denied due to rate limiting
    Denied {
        retry_after: u64,
        limit: u32,
        reset_at: i64,
    },
}

impl RateLimitResult {
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateLimitResult::Allowed { .. })
    }
}

/// Fixed window rate limiter keyed by source address.
pub struct RateLimiter {
    /// source address -> current window
    windows: DashMap<String, FixedWindow>,
    config: RateLimitConfig,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            windows: DashMap::new(),
            config,
        }
    }

    /// Check if rate limiting is enabled
    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    /// Count one request from `address`.
    pub fn check(&self, address: &str) -> RateLimitResult {
        self.check_at(address, FixedWindow::now_millis())
    }

    /// Count one request from `address` at the given time (Unix milliseconds).
    pub fn check_at(&self, address: &str, now: i64) -> RateLimitResult {
        let limit = self.config.max_requests;

        if !self.config.enabled {
            return RateLimitResult::Allowed {
                remaining: u32::MAX,
                limit: 0,
                reset_at: 0,
            };
        }

        let window_ms = self.config.window_millis();

        // The entry guard holds the shard lock, so the hit is atomic per address
        let mut entry = self
            .windows
            .entry(address.to_string())
            .or_insert_with(|| FixedWindow::new(now));
        let window = entry.value_mut();

        // Reset timestamps are reported in seconds, like express-style limiters
        if window.try_hit(now, limit, window_ms) {
            RateLimitResult::Allowed {
                remaining: limit - window.count(),
                limit,
                reset_at: window.resets_at(window_ms) / 1000,
            }
        } else {
            RateLimitResult::Denied {
                retry_after: window.retry_after(now, window_ms),
                limit,
                reset_at: window.resets_at(window_ms) / 1000,
            }
        }
    }

    /// Remove windows that have fully elapsed
    pub fn cleanup_stale(&self) -> usize {
        self.cleanup_stale_at(FixedWindow::now_millis())
    }

    pub fn cleanup_stale_at(&self, now: i64) -> usize {
        let window_ms = self.config.window_millis();
        let before = self.windows.len();

        self.windows
            .retain(|_, window| !window.is_expired(now, window_ms));

        let removed = before.saturating_sub(self.windows.len());
        if removed > 0 {
            tracing::debug!(
                removed = removed,
                windows = self.windows.len(),
                "Cleaned up expired rate limit windows"
            );
        }

        removed
    }

    pub fn stats(&self) -> RateLimiterStats {
        RateLimiterStats {
            enabled: self.config.enabled,
            tracked_addresses: self.windows.len(),
            max_requests: self.config.max_requests,
            window_seconds: self.config.window_seconds,
        }
    }
}

/// Statistics about the rate limiter
#[derive(Debug, Clone, Serialize)]
pub struct RateLimiterStats {
    pub enabled: bool,
    pub tracked_addresses: usize,
    pub max_requests: u32,
    pub window_seconds: u64,
}
