//! Metrics helper structs for convenient metric recording

use prometheus::{Encoder, TextEncoder};

use super::{
    GATE_ADMISSIONS_TOTAL, GATE_CONNECTIONS_ACTIVE, GATE_MESSAGES_TOO_BIG_TOTAL,
    GATE_TRACKED_ADDRESSES, GATE_TRANSPORT_ERRORS_TOTAL, PAGE_RENDERS_TOTAL, RATELIMIT_ALLOWED_TOTAL,
    RATELIMIT_DENIED_TOTAL, SIGNUPS_TOTAL,
};

/// Encode all metrics to Prometheus text format
pub fn encode_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8(buffer).unwrap_or_default())
}

/// Helper struct for signup metrics
pub struct SignupMetrics;

impl SignupMetrics {
    pub fn record_created() {
        SIGNUPS_TOTAL.with_label_values(&["created"]).inc();
    }

    pub fn record_invalid() {
        SIGNUPS_TOTAL.with_label_values(&["invalid"]).inc();
    }

    pub fn record_duplicate() {
        SIGNUPS_TOTAL.with_label_values(&["duplicate"]).inc();
    }

    pub fn record_failed() {
        SIGNUPS_TOTAL.with_label_values(&["failed"]).inc();
    }
}

/// Helper struct for connection gate metrics
pub struct GateMetrics;

impl GateMetrics {
    /// Record an admitted connection
    pub fn record_accepted() {
        GATE_ADMISSIONS_TOTAL.with_label_values(&["accepted"]).inc();
        GATE_CONNECTIONS_ACTIVE.inc();
    }

    /// Record a connection rejected by the per-address cap
    pub fn record_rejected() {
        GATE_ADMISSIONS_TOTAL.with_label_values(&["rejected"]).inc();
    }

    /// Record an admitted connection going away
    pub fn record_released() {
        GATE_CONNECTIONS_ACTIVE.dec();
    }

    pub fn record_transport_error() {
        GATE_TRANSPORT_ERRORS_TOTAL.inc();
    }

    pub fn record_message_too_big() {
        GATE_MESSAGES_TOO_BIG_TOTAL.inc();
    }

    pub fn set_tracked_addresses(count: usize) {
        GATE_TRACKED_ADDRESSES.set(count as i64);
    }
}

/// Helper struct for rate limiting metrics
pub struct RateLimitMetrics;

impl RateLimitMetrics {
    pub fn record_allowed() {
        RATELIMIT_ALLOWED_TOTAL.inc();
    }

    pub fn record_denied() {
        RATELIMIT_DENIED_TOTAL.inc();
    }
}

/// Helper struct for user page metrics
pub struct PageMetrics;

impl PageMetrics {
    pub fn record_rendered() {
        PAGE_RENDERS_TOTAL.with_label_values(&["rendered"]).inc();
    }

    pub fn record_failed() {
        PAGE_RENDERS_TOTAL.with_label_values(&["failed"]).inc();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_contains_recorded_metrics() {
        SignupMetrics::record_created();
        RateLimitMetrics::record_denied();

        let output = encode_metrics().unwrap();
        assert!(output.contains("gatehouse_signups_total"));
        assert!(output.contains("gatehouse_ratelimit_denied_total"));
    }
}
