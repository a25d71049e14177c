use axum::{
    routing::{get, post},
    Router,
};

use crate::gateway::ws_handler;
use crate::page::user_page;
use crate::server::{AppState, GatewayState, PageState};

use super::handlers::{hi, signup};
use super::health::{api_health, gateway_health, health};
use super::metrics::prometheus_metrics;

/// Signup API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/hi", get(hi))
        .route("/signup", post(signup))
        .route("/health", get(api_health))
        .route("/metrics", get(prometheus_metrics))
}

/// WebSocket gate routes. The socket is served on `/` and `/ws`.
pub fn gateway_routes() -> Router<GatewayState> {
    Router::new()
        .route("/", get(ws_handler))
        .route("/ws", get(ws_handler))
        .route("/health", get(gateway_health))
        .route("/metrics", get(prometheus_metrics))
}

/// User page routes
pub fn page_routes() -> Router<PageState> {
    Router::new()
        .route("/", get(user_page))
        .route("/health", get(health))
}
