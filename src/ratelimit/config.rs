//! Rate limiting configuration

use serde::Deserialize;

/// Configuration for HTTP rate limiting
#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    /// Whether rate limiting is enabled
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Requests allowed per source address in one window
    #[serde(default = "default_max_requests")]
    pub max_requests: u32,
    /// Window length in seconds
    #[serde(default = "default_window_seconds")]
    pub window_seconds: u64,
    /// Cleanup interval for expired windows in seconds
    #[serde(default = "default_cleanup_interval")]
    pub cleanup_interval_seconds: u64,
    /// Body of the 429 response
    #[serde(default = "default_message")]
    pub message: String,
}

fn default_enabled() -> bool {
    true
}

fn default_max_requests() -> u32 {
    100
}

fn default_window_seconds() -> u64 {
    15 * 60 // 15 minutes
}

fn default_cleanup_interval() -> u64 {
    60
}

fn default_message() -> String {
    "Too many requests from this IP, please try again later".to_string()
}

impl RateLimitConfig {
    pub fn window_millis(&self) -> i64 {
        (self.window_seconds as i64).saturating_mul(1000)
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            max_requests: default_max_requests(),
            window_seconds: default_window_seconds(),
            cleanup_interval_seconds: default_cleanup_interval(),
            message: default_message(),
        }
    }
}
