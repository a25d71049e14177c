//! Per-address request rate limiting for the HTTP API.
//!
//! Each source address gets a fixed counting window (100 requests per
//! 15 minutes by default). Windows are kept in memory and purged by the
//! cleanup task once they have expired.

mod config;
mod limiter;
mod window;

pub use config::RateLimitConfig;
pub use limiter::{RateLimitResult, RateLimiter, RateLimiterStats};
pub use window::FixedWindow;
