use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use tuition_api::config::AppConfig;
use tuition_api::database::{DatabaseManager, MemoryStore, PgStore, Store};
use tuition_api::services::video::VimeoClient;
use tuition_api::{app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so `cargo run` picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("tuition_api=info,tower_http=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = AppConfig::from_env().context("invalid configuration")?;
    tracing::info!(
        "Starting Tuition API in {:?} mode (frontend origin {})",
        config.environment,
        config.server.frontend_url
    );

    let (store, database): (Arc<dyn Store>, Option<DatabaseManager>) = if config.database.is_memory() {
        tracing::warn!("Using the in-memory store; all data is lost on exit");
        (Arc::new(MemoryStore::new()), None)
    } else {
        let manager = DatabaseManager::connect(&config.database)
            .await
            .context("failed to connect to the database")?;
        manager.migrate().await?;
        (Arc::new(PgStore::new(manager.pool().clone())), Some(manager))
    };

    tokio::fs::create_dir_all(&config.server.uploads_dir)
        .await
        .with_context(|| format!("failed to create {}", config.server.uploads_dir.display()))?;

    let video = Arc::new(VimeoClient::from_config(&config.integrations));
    let port = config.server.port;
    let state = AppState::new(config, store, video);

    let listener = TcpListener::bind(("0.0.0.0", port))
        .await
        .with_context(|| format!("failed to bind port {}", port))?;
    tracing::info!("Tuition API listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(database) = database {
        database.close().await;
    }
    tracing::info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                tracing::error!("Failed to listen for SIGTERM: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
    tracing::info!("Shutdown signal received, draining connections");
}
