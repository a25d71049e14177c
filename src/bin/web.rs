use std::net::SocketAddr;

use anyhow::Result;
use tokio::net::TcpListener;
use tokio::sync::broadcast;

use gatehouse::config::Settings;
use gatehouse::postgres::PostgresPool;
use gatehouse::server::{create_page_app, PageState};
use gatehouse::shutdown::shutdown_signal;
use gatehouse::telemetry::init_tracing;
use gatehouse::users::create_users_store;

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::new()?;
    init_tracing(&settings.logging);

    let postgres_pool = PostgresPool::from_config(&settings.database).await?;
    let store = create_users_store(postgres_pool.as_ref()).await?;

    let app = create_page_app(PageState::new(store));

    let addr = settings.web_addr();
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("Web page listening on {}", addr);

    let (shutdown_tx, _) = broadcast::channel::<()>(1);

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal(shutdown_tx))
        .await?;

    if let Some(pool) = postgres_pool {
        pool.close().await;
    }

    tracing::info!("Server shutdown complete");
    Ok(())
}
