//! Prometheus metrics.
//!
//! - Signup outcomes
//! - Connection gate admissions and active connections
//! - HTTP rate limiting decisions
//! - User page renders

mod helpers;

pub use helpers::{encode_metrics, GateMetrics, PageMetrics, RateLimitMetrics, SignupMetrics};

use lazy_static::lazy_static;
use prometheus::{
    register_int_counter, register_int_counter_vec, register_int_gauge, IntCounter,
    IntCounterVec, IntGauge,
};

/// Prefix for all metrics
const METRIC_PREFIX: &str = "gatehouse";

lazy_static! {
    // ============================================================================
    // Signup Metrics
    // ============================================================================

    /// Signup attempts by outcome (created, invalid, duplicate, failed)
    pub static ref SIGNUPS_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_signups_total", METRIC_PREFIX),
        "Total signup attempts by outcome",
        &["outcome"]
    ).unwrap();

    // ============================================================================
    // Connection Gate Metrics
    // ============================================================================

    /// Gate admission decisions (accepted, rejected)
    pub static ref GATE_ADMISSIONS_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_gate_admissions_total", METRIC_PREFIX),
        "Total WebSocket connections by admission outcome",
        &["outcome"]
    ).unwrap();

    /// Currently admitted WebSocket connections
    pub static ref GATE_CONNECTIONS_ACTIVE: IntGauge = register_int_gauge!(
        format!("{}_gate_connections_active", METRIC_PREFIX),
        "Number of admitted WebSocket connections"
    ).unwrap();

    /// Source addresses with at least one admitted connection
    pub static ref GATE_TRACKED_ADDRESSES: IntGauge = register_int_gauge!(
        format!("{}_gate_tracked_addresses", METRIC_PREFIX),
        "Number of source addresses with open connections"
    ).unwrap();

    /// Connections closed with an internal error
    pub static ref GATE_TRANSPORT_ERRORS_TOTAL: IntCounter = register_int_counter!(
        format!("{}_gate_transport_errors_total", METRIC_PREFIX),
        "Total WebSocket connections closed because of a transport error"
    ).unwrap();

    /// Connections closed because an inbound message exceeded the payload limit
    pub static ref GATE_MESSAGES_TOO_BIG_TOTAL: IntCounter = register_int_counter!(
        format!("{}_gate_messages_too_big_total", METRIC_PREFIX),
        "Total WebSocket connections closed for an oversized message"
    ).unwrap();

    // ============================================================================
    // Rate Limiting Metrics
    // ============================================================================

    /// Requests allowed by rate limiter
    pub static ref RATELIMIT_ALLOWED_TOTAL: IntCounter = register_int_counter!(
        format!("{}_ratelimit_allowed_total", METRIC_PREFIX),
        "Total requests allowed by rate limiter"
    ).unwrap();

    /// Requests denied by rate limiter
    pub static ref RATELIMIT_DENIED_TOTAL: IntCounter = register_int_counter!(
        format!("{}_ratelimit_denied_total", METRIC_PREFIX),
        "Total requests denied by rate limiter"
    ).unwrap();

    // ============================================================================
    // Page Metrics
    // ============================================================================

    pub static ref PAGE_RENDERS_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_page_renders_total", METRIC_PREFIX),
        "Total user page renders by outcome",
        &["outcome"]
    ).unwrap();
}
