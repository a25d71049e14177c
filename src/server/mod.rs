mod app;
mod middleware;
mod state;

pub use app::{create_app, create_gateway_app, create_page_app};
pub use middleware::{rate_limit_middleware, SourceAddress, UNKNOWN_ADDRESS};
pub use state::{AppState, GatewayState, PageState};
