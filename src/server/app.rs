use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderName, HeaderValue},
    middleware, Router,
};
use tower_http::{set_header::SetResponseHeaderLayer, trace::TraceLayer};

use crate::api::{api_routes, gateway_routes, page_routes};

use super::middleware::rate_limit_middleware;
use super::{AppState, GatewayState, PageState};

/// Signup API: routes, rate limiting and security headers.
pub fn create_app(state: AppState) -> Router {
    let body_limit = state.settings.http.body_limit_bytes;

    let router = Router::new()
        .merge(api_routes())
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ))
        .layer(TraceLayer::new_for_http());

    // Outermost, so rate limited responses carry the headers too
    with_security_headers(router).with_state(state)
}

/// WebSocket gate server
pub fn create_gateway_app(state: GatewayState) -> Router {
    Router::new()
        .merge(gateway_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// User page server
pub fn create_page_app(state: PageState) -> Router {
    with_security_headers(
        Router::new()
            .merge(page_routes())
            .layer(TraceLayer::new_for_http()),
    )
    .with_state(state)
}

fn with_security_headers<S>(router: Router<S>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("x-xss-protection"),
            HeaderValue::from_static("1; mode=block"),
        ))
}
