use std::convert::Infallible;
use std::net::SocketAddr;

use axum::{
    body::Body,
    extract::{ConnectInfo, FromRequestParts, State},
    http::{request::Parts, HeaderValue, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use super::AppState;
use crate::metrics::RateLimitMetrics;
use crate::ratelimit::RateLimitResult;

/// Key used when the peer address cannot be determined
pub const UNKNOWN_ADDRESS: &str = "unknown";

/// Source IP of the request's connection, or `"unknown"`.
///
/// Requires the server to be started with
/// `into_make_service_with_connect_info::<SocketAddr>()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceAddress(pub String);

impl<S> FromRequestParts<S> for SourceAddress
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let address = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip().to_string())
            .unwrap_or_else(|| UNKNOWN_ADDRESS.to_string());

        Ok(Self(address))
    }
}

/// Rate limiting middleware for HTTP API requests.
///
/// Counts every request against its source address and answers 429 with a
/// Retry-After header once the window is used up.
pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    SourceAddress(address): SourceAddress,
    req: Request<Body>,
    next: Next,
) -> Response {
    if !state.rate_limiter.is_enabled() {
        return next.run(req).await;
    }

    match state.rate_limiter.check(&address) {
        RateLimitResult::Allowed {
            remaining,
            limit,
            reset_at,
        } => {
            RateLimitMetrics::record_allowed();
            let mut response = next.run(req).await;

            let headers = response.headers_mut();
            if let Ok(v) = HeaderValue::from_str(&limit.to_string()) {
                headers.insert("X-RateLimit-Limit", v);
            }
            if let Ok(v) = HeaderValue::from_str(&remaining.to_string()) {
                headers.insert("X-RateLimit-Remaining", v);
            }
            if let Ok(v) = HeaderValue::from_str(&reset_at.to_string()) {
                headers.insert("X-RateLimit-Reset", v);
            }

            response
        }
        RateLimitResult::Denied {
            retry_after,
            limit,
            reset_at,
        } => {
            RateLimitMetrics::record_denied();
            tracing::warn!(
                address = %address,
                retry_after = retry_after,
                "Rate limit exceeded"
            );

            rate_limit_response(&state.rate_limiter.config().message, retry_after, limit, reset_at)
        }
    }
}

/// Build a rate limit error response with proper headers
fn rate_limit_response(message: &str, retry_after: u64, limit: u32, reset_at: i64) -> Response {
    let body = json!({ "error": message });

    let mut response = (StatusCode::TOO_MANY_REQUESTS, Json(body)).into_response();

    let headers = response.headers_mut();
    if let Ok(v) = HeaderValue::from_str(&retry_after.to_string()) {
        headers.insert("Retry-After", v);
    }
    if let Ok(v) = HeaderValue::from_str(&limit.to_string()) {
        headers.insert("X-RateLimit-Limit", v);
    }
    headers.insert("X-RateLimit-Remaining", HeaderValue::from_static("0"));
    if let Ok(v) = HeaderValue::from_str(&reset_at.to_string()) {
        headers.insert("X-RateLimit-Reset", v);
    }

    response
}
