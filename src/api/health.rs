//! Health check endpoints.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::ratelimit::RateLimiterStats;
use crate::server::{AppState, GatewayState};

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ApiHealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub users: UsersHealthResponse,
    pub rate_limit: RateLimiterStats,
}

#[derive(Debug, Serialize)]
pub struct UsersHealthResponse {
    pub backend: &'static str,
    pub connected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct GatewayHealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub tracked_addresses: usize,
    pub active_connections: usize,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Signup API health: users store reachability and rate limiter state
pub async fn api_health(State(state): State<AppState>) -> Json<ApiHealthResponse> {
    let store = state.signup.store();

    let count = match store.count().await {
        Ok(count) => Some(count),
        Err(e) => {
            tracing::warn!(error = %e, backend = store.backend(), "Users store health check failed");
            None
        }
    };

    Json(ApiHealthResponse {
        status: if count.is_some() { "healthy" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        users: UsersHealthResponse {
            backend: store.backend(),
            connected: count.is_some(),
            count,
        },
        rate_limit: state.rate_limiter.stats(),
    })
}

pub async fn gateway_health(State(state): State<GatewayState>) -> Json<GatewayHealthResponse> {
    Json(GatewayHealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        tracked_addresses: state.gate.tracked_addresses(),
        active_connections: state.gate.active_connections(),
    })
}
