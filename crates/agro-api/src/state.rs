//! # Application State
//!
//! Shared state for the Axum application, passed to all route handlers
//! via the `State` extractor.
//!
//! The in-memory [`Registry`] is the source of truth while the process
//! runs. When a database pool is configured it is hydrated from Postgres
//! on startup and every successful mutation is written through.

use std::collections::HashSet;
use std::convert::Infallible;
use std::sync::Arc;

use metrics_exporter_prometheus::PrometheusHandle;
use sqlx::PgPool;

use agro_core::{Crop, Farm, FarmId, Harvest, HarvestId, Producer, ProducerId};
use agro_registry::{InMemoryRepository, Registry, Repository, UnitOfWork};

// -- Configuration ------------------------------------------------------------

/// Application configuration, read once at startup.
///
/// Custom `Debug` redacts the token and database URL.
#[derive(Clone)]
pub struct AppConfig {
    /// Interface to bind the HTTP server to.
    pub host: String,
    /// Port to bind the HTTP server to.
    pub port: u16,
    /// Static bearer secret. If `None`, authentication is disabled.
    pub auth_token: Option<String>,
    /// Postgres connection string. If `None`, the API runs in-memory only.
    pub database_url: Option<String>,
    /// Seed the sample dataset into an empty registry on startup.
    pub seed_sample_data: bool,
    /// Mount `/metrics` and record request metrics.
    pub metrics_enabled: bool,
    /// Emit logs as JSON lines instead of the human-readable format.
    pub json_logs: bool,
}

impl AppConfig {
    /// Build configuration from environment variables, falling back to
    /// defaults for anything unset or unparseable.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            host: non_empty("SERVER_HOST").unwrap_or(defaults.host),
            port: non_empty("SERVER_PORT")
                .and_then(|p| p.trim().parse().ok())
                .unwrap_or(defaults.port),
            auth_token: non_empty("AUTH_TOKEN"),
            database_url: non_empty("DATABASE_URL"),
            seed_sample_data: non_empty("SEED_SAMPLE_DATA")
                .map(|v| parse_flag(&v))
                .unwrap_or(defaults.seed_sample_data),
            metrics_enabled: non_empty("METRICS_ENABLED")
                .map(|v| parse_flag(&v))
                .unwrap_or(defaults.metrics_enabled),
            json_logs: non_empty("LOG_FORMAT")
                .map(|v| v.trim().eq_ignore_ascii_case("json"))
                .unwrap_or(defaults.json_logs),
        }
    }

    /// `host:port` for the listener.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field(
                "auth_token",
                &self.auth_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field(
                "database_url",
                &self.database_url.as_ref().map(|_| "[REDACTED]"),
            )
            .field("seed_sample_data", &self.seed_sample_data)
            .field("metrics_enabled", &self.metrics_enabled)
            .field("json_logs", &self.json_logs)
            .finish()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            auth_token: None,
            database_url: None,
            seed_sample_data: false,
            metrics_enabled: true,
            json_logs: false,
        }
    }
}

// -- AppState -----------------------------------------------------------------

/// Shared application state. Cloning is cheap: the registry's tables, the
/// pool and the metrics handle are all reference-counted.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Domain services over the in-memory store.
    pub registry: Registry<InMemoryRepository>,
    /// Postgres pool for write-through persistence (None = in-memory only).
    pub db_pool: Option<PgPool>,
    /// Prometheus render handle (None = no recorder installed).
    pub metrics: Option<PrometheusHandle>,
    /// Application configuration.
    pub config: AppConfig,
    /// Serializes mutations together with their write-through, so the
    /// database sees changes in the order the registry committed them.
    pub write_gate: Arc<tokio::sync::Mutex<()>>,
}

impl AppState {
    /// Empty registry, default configuration, no database, no metrics.
    pub fn new() -> Self {
        Self::with_config(AppConfig::default())
    }

    /// Empty registry with the given configuration.
    pub fn with_config(config: AppConfig) -> Self {
        Self {
            registry: Registry::with_system_clock(InMemoryRepository::new()),
            db_pool: None,
            metrics: None,
            config,
            write_gate: Arc::new(tokio::sync::Mutex::new(())),
        }
    }

    /// Attach a database pool.
    pub fn with_db_pool(mut self, pool: Option<PgPool>) -> Self {
        self.db_pool = pool;
        self
    }

    /// Attach a Prometheus handle.
    pub fn with_metrics(mut self, handle: Option<PrometheusHandle>) -> Self {
        self.metrics = handle;
        self
    }

    /// Hydrate the in-memory registry from the database.
    ///
    /// Called once on startup when a database pool is available. Rows are
    /// loaded parent-first so every record lands after its owner. Rows the
    /// loaders skipped (invalid document, unknown crop type) take their
    /// descendants with them.
    pub async fn hydrate_from_db(&self) -> Result<(), String> {
        let pool = match &self.db_pool {
            Some(pool) => pool,
            None => return Ok(()),
        };

        let mut rows = LoadedRows {
            producers: crate::db::producers::load_all(pool)
                .await
                .map_err(|e| format!("failed to load producers from database: {e}"))?,
            farms: crate::db::farms::load_all(pool)
                .await
                .map_err(|e| format!("failed to load farms from database: {e}"))?,
            harvests: crate::db::harvests::load_all(pool)
                .await
                .map_err(|e| format!("failed to load harvests from database: {e}"))?,
            crops: crate::db::crops::load_all(pool)
                .await
                .map_err(|e| format!("failed to load crops from database: {e}"))?,
        };

        let orphans = rows.retain_connected();
        if orphans > 0 {
            tracing::warn!(
                orphans,
                "skipped database rows whose parent record could not be loaded"
            );
        }

        let (producer_count, farm_count, harvest_count, crop_count) = (
            rows.producers.len(),
            rows.farms.len(),
            rows.harvests.len(),
            rows.crops.len(),
        );

        let loaded: Result<(), Infallible> = self.registry.repository().transact(|unit| {
            for producer in rows.producers {
                unit.put_producer(producer);
            }
            for farm in rows.farms {
                unit.put_farm(farm);
            }
            for harvest in rows.harvests {
                unit.put_harvest(harvest);
            }
            for crop in rows.crops {
                unit.put_crop(crop);
            }
            Ok(())
        });
        if let Err(never) = loaded {
            match never {}
        }

        tracing::info!(
            producers = producer_count,
            farms = farm_count,
            harvests = harvest_count,
            crops = crop_count,
            "hydrated registry from database"
        );
        Ok(())
    }
}

/// Rows read from Postgres on startup, before they enter the registry.
#[derive(Debug, Default)]
struct LoadedRows {
    producers: Vec<Producer>,
    farms: Vec<Farm>,
    harvests: Vec<Harvest>,
    crops: Vec<Crop>,
}

impl LoadedRows {
    /// Drop every row whose parent is not present, walking down from
    /// producers so a skipped producer also drops its farms' harvests and
    /// crops. Returns the number of rows dropped.
    fn retain_connected(&mut self) -> usize {
        let before = self.farms.len() + self.harvests.len() + self.crops.len();

        let producer_ids: HashSet<ProducerId> = self.producers.iter().map(|p| p.id).collect();
        self.farms.retain(|f| producer_ids.contains(&f.producer_id));

        let farm_ids: HashSet<FarmId> = self.farms.iter().map(|f| f.id).collect();
        self.harvests.retain(|h| farm_ids.contains(&h.farm_id));

        let harvest_ids: HashSet<HarvestId> = self.harvests.iter().map(|h| h.id).collect();
        self.crops.retain(|c| harvest_ids.contains(&c.harvest_id));

        before - (self.farms.len() + self.harvests.len() + self.crops.len())
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
