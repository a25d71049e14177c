use std::net::SocketAddr;

use anyhow::Result;
use tokio::net::TcpListener;
use tokio::sync::broadcast;

use gatehouse::config::Settings;
use gatehouse::server::{create_gateway_app, GatewayState};
use gatehouse::shutdown::shutdown_signal;
use gatehouse::telemetry::init_tracing;

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::new()?;
    init_tracing(&settings.logging);

    let state = GatewayState::new(&settings);
    tracing::info!(
        max_connections_per_address = settings.gateway.max_connections_per_address,
        max_payload_bytes = settings.gateway.max_payload_bytes,
        "Connection gate initialized"
    );

    let app = create_gateway_app(state);

    let addr = settings.gateway_addr();
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("WebSocket server listening on {}", addr);

    let (shutdown_tx, _) = broadcast::channel::<()>(1);

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal(shutdown_tx))
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}
