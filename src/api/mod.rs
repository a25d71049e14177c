mod handlers;
mod health;
mod metrics;
mod routes;

pub use handlers::{hi, signup, MessageResponse, SignupResponse};
pub use health::{
    api_health, gateway_health, health, ApiHealthResponse, GatewayHealthResponse, HealthResponse,
    UsersHealthResponse,
};
pub use metrics::prometheus_metrics;
pub use routes::{api_routes, gateway_routes, page_routes};
