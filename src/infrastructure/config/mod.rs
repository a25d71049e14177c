mod settings;

pub use settings::{
    DatabaseConfig, GatewayConfig, HttpConfig, LoggingConfig, Settings, WebConfig,
};
