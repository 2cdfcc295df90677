//! # Database Persistence Layer
//!
//! Postgres write-through persistence for registry records via SQLx.
//!
//! The database layer is **optional**. When `DATABASE_URL` is set, the API
//! hydrates the in-memory registry from Postgres on startup and writes
//! every successful mutation through. When absent, the API operates in
//! in-memory-only mode (suitable for development and testing).
//!
//! Foreign keys are declared `ON DELETE CASCADE`, so deleting a producer,
//! farm or harvest row removes its descendants exactly as the registry's
//! cascade does.

pub mod crops;
pub mod farms;
pub mod harvests;
pub mod producers;
pub mod rollback;

use sqlx::postgres::{PgPool, PgPoolOptions};

/// Initialize the database connection pool and run migrations.
///
/// Returns `None` if no URL is configured (in-memory-only mode).
/// Returns `Err` if the URL is set but the connection or migration fails.
pub async fn init_pool(database_url: Option<&str>) -> Result<Option<PgPool>, sqlx::Error> {
    let url = match database_url {
        Some(url) => url,
        None => {
            tracing::warn!(
                "DATABASE_URL not set — running in-memory only mode. \
                 Records will not survive restarts."
            );
            return Ok(None);
        }
    };

    let pool = PgPoolOptions::new()
        .max_connections(20)
        .min_connections(2)
        .acquire_timeout(std::time::Duration::from_secs(5))
        .connect(url)
        .await?;

    tracing::info!("Connected to PostgreSQL");

    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::info!("Database migrations applied");

    Ok(Some(pool))
}

/// Round-trip a trivial query. Used by the readiness probe.
pub async fn ping(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}
