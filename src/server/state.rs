use std::sync::Arc;

use crate::config::Settings;
use crate::gateway::ConnectionGate;
use crate::ratelimit::RateLimiter;
use crate::signup::SignupService;
use crate::users::UsersStore;

/// State of the signup HTTP API
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub signup: Arc<SignupService>,
    pub rate_limiter: Arc<RateLimiter>,
}

impl AppState {
    pub fn new(settings: Settings, store: Arc<dyn UsersStore>) -> Self {
        let rate_limiter = Arc::new(RateLimiter::new(settings.rate_limit.clone()));
        let signup = Arc::new(SignupService::new(store));

        Self {
            settings: Arc::new(settings),
            signup,
            rate_limiter,
        }
    }
}

/// State of the WebSocket gate server
#[derive(Clone)]
pub struct GatewayState {
    pub gate: Arc<ConnectionGate>,
}

impl GatewayState {
    pub fn new(settings: &Settings) -> Self {
        Self {
            gate: Arc::new(ConnectionGate::new(settings.gateway.clone())),
        }
    }
}

/// State of the user page server
#[derive(Clone)]
pub struct PageState {
    pub store: Arc<dyn UsersStore>,
}

impl PageState {
    pub fn new(store: Arc<dyn UsersStore>) -> Self {
        Self { store }
    }
}
