use anyhow::Context;

use juntas_api::app::app;
use juntas_api::config::config;
use juntas_api::database::DatabaseManager;
use juntas_api::logging::init_logging;
use juntas_api::mailer;
use juntas_api::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    let config = config();
    config.validate().map_err(anyhow::Error::msg)?;

    let _log_guard = init_logging(&config.logging)?;
    tracing::info!("Starting Juntas API in {:?} mode", config.environment);

    let pool = DatabaseManager::connect(&config.database)?;
    if config.database.auto_migrate {
        DatabaseManager::migrate(&pool).await?;
    }

    let mailer = mailer::from_config(&config.mail)?;
    let state = AppState::new(pool.clone(), mailer);

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Juntas API listening on http://{}", bind_addr);

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    DatabaseManager::close(&pool).await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
