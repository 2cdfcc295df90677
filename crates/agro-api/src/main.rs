//! # agro-api — Binary Entry Point
//!
//! Starts the Axum HTTP server for the rural producer registry.
//! Binds to `SERVER_HOST:SERVER_PORT` (default `0.0.0.0:8000`).

use agro_api::state::{AppConfig, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::from_env();

    // Initialize structured tracing.
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    if config.json_logs {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    tracing::info!(?config, "configuration loaded");

    // Install the Prometheus recorder before any request is served.
    let metrics = if config.metrics_enabled {
        let handle = agro_api::middleware::metrics::install_recorder().map_err(|e| {
            tracing::error!("Metrics recorder installation failed: {e}");
            e
        })?;
        Some(handle)
    } else {
        None
    };

    // Initialize database pool (absent means in-memory only).
    let db_pool = agro_api::db::init_pool(config.database_url.as_deref())
        .await
        .map_err(|e| {
            tracing::error!("Database initialization failed: {e}");
            e
        })?;

    let seed = config.seed_sample_data;
    let bind_address = config.bind_address();
    let state = AppState::with_config(config)
        .with_db_pool(db_pool)
        .with_metrics(metrics);

    // Hydrate the in-memory registry from the database (if connected).
    state.hydrate_from_db().await.map_err(|e| {
        tracing::error!("Database hydration failed: {e}");
        e
    })?;

    if seed {
        agro_api::bootstrap::seed_sample_data(&state)
            .await
            .map_err(|e| {
                tracing::error!("Sample data bootstrap failed: {e}");
                e
            })?;
    }

    let app = agro_api::app(state);

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("Agro API listening on {}", bind_address);
    axum::serve(listener, app).await?;

    Ok(())
}
