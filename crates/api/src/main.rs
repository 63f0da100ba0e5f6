use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use persistence::repositories::{EntryStore, InMemoryEntryStore, SqliteEntryStore};
use tokio::signal;
use tracing::{error, info};
use weather_dashboard_api::{
    app,
    config::{Config, StorageBackend},
    jobs::{ForecastRefreshJob, JobScheduler},
    middleware,
    services::OpenWeatherMapClient,
};

async fn build_store(config: &Config) -> Result<Arc<dyn EntryStore>> {
    match config.storage.backend {
        StorageBackend::Memory => {
            info!("Using in-memory entry store");
            Ok(Arc::new(InMemoryEntryStore::new()))
        }
        StorageBackend::Sqlite => {
            let pool = persistence::db::create_pool(&config.storage.database_config())
                .await
                .context("Failed to open SQLite database")?;

            info!("Running database migrations...");
            persistence::db::run_migrations(&pool).await?;
            info!("Migrations completed");

            Ok(Arc::new(SqliteEntryStore::new(pool)))
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received Ctrl+C, shutting down"),
        () = terminate => info!("Received SIGTERM, shutting down"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let config = Config::load()?;

    middleware::logging::init_logging(&config.logging)?;
    middleware::init_metrics()?;

    info!("Starting Weather Dashboard API v{}", env!("CARGO_PKG_VERSION"));

    let store = build_store(&config).await?;
    let forecast = Arc::new(OpenWeatherMapClient::new(&config.forecast)?);

    let mut scheduler = JobScheduler::new();
    if config.jobs.forecast_refresh_enabled {
        scheduler.register(ForecastRefreshJob::new(
            config.jobs.forecast_refresh_interval_hours,
            config.forecast.default_city.clone(),
        ));
    }
    scheduler.start();

    let addr = config
        .socket_addr()
        .context("Invalid server host or port")?;
    let app = app::create_app(config, store, forecast);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    scheduler.shutdown();
    scheduler.wait_for_shutdown(Duration::from_secs(10)).await;

    Ok(())
}
