use std::net::SocketAddr;

use anyhow::Result;
use tokio::net::TcpListener;
use tokio::sync::broadcast;

use gatehouse::config::Settings;
use gatehouse::postgres::PostgresPool;
use gatehouse::server::{create_app, AppState};
use gatehouse::shutdown::shutdown_signal;
use gatehouse::tasks::RateLimitCleanupTask;
use gatehouse::telemetry::init_tracing;
use gatehouse::users::create_users_store;

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::new()?;
    init_tracing(&settings.logging);
    tracing::info!("Configuration loaded");

    let postgres_pool = PostgresPool::from_config(&settings.database).await?;
    let store = create_users_store(postgres_pool.as_ref()).await?;

    let state = AppState::new(settings.clone(), store);
    tracing::info!(
        rate_limit_enabled = state.rate_limiter.is_enabled(),
        max_requests = settings.rate_limit.max_requests,
        window_seconds = settings.rate_limit.window_seconds,
        "Application state initialized"
    );

    let (shutdown_tx, _) = broadcast::channel::<()>(1);

    let cleanup_task = RateLimitCleanupTask::new(state.rate_limiter.clone(), shutdown_tx.subscribe());
    let cleanup_handle = tokio::spawn(cleanup_task.run());

    let app = create_app(state);

    let addr = settings.http_addr();
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal(shutdown_tx))
        .await?;

    let _ = cleanup_handle.await;
    if let Some(pool) = postgres_pool {
        pool.close().await;
    }

    tracing::info!("Server shutdown complete");
    Ok(())
}
