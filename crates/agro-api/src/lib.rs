//! # agro-api — HTTP Surface for the Rural Producer Registry
//!
//! Axum application exposing producer, farm, harvest and crop operations
//! and the dashboard aggregations of [`agro_registry`].
//!
//! ## Layout
//!
//! - [`routes`] — one module per resource, assembled by [`routes::api_router`].
//! - [`auth`] — bearer token middleware and role checks.
//! - [`db`] — optional Postgres write-through persistence.
//! - [`bootstrap`] — sample dataset seeding.
//! - [`middleware`] — request metrics.
//! - [`openapi`] — generated OpenAPI document.
//!
//! Health probes (`/health/*`) and `/metrics` are mounted outside the auth
//! middleware so they remain accessible without credentials.

pub mod auth;
pub mod bootstrap;
pub mod db;
pub mod error;
pub mod extractors;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod state;

use axum::extract::{DefaultBodyLimit, State};
use axum::http::{header, StatusCode};
use axum::middleware::from_fn;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

use agro_registry::{ReadUnit, Repository};

use crate::auth::AuthConfig;
use crate::state::AppState;

/// Assemble the full application router with all routes and middleware.
///
/// Middleware execution order for `/api` (outermost → innermost):
///   TraceLayer → MetricsMiddleware → AuthMiddleware → Handler
pub fn app(state: AppState) -> Router {
    let auth_config = AuthConfig {
        token: state.config.auth_token.clone(),
    };
    let metrics_on = state.config.metrics_enabled;

    let mut api = routes::api_router()
        .merge(openapi::router())
        .layer(DefaultBodyLimit::max(1024 * 1024))
        .layer(from_fn(auth::auth_middleware));

    if metrics_on {
        api = api.layer(from_fn(middleware::metrics::metrics_middleware));
    }

    let api = api
        .layer(TraceLayer::new_for_http())
        .layer(axum::Extension(auth_config))
        .with_state(state.clone());

    let mut unauthenticated = Router::new()
        .route("/health/liveness", get(liveness))
        .route("/health/readiness", get(readiness));

    if metrics_on {
        unauthenticated = unauthenticated.route("/metrics", get(prometheus_metrics));
    }

    let unauthenticated = unauthenticated.with_state(state);

    Router::new().merge(unauthenticated).merge(api)
}

/// GET /metrics — Prometheus scrape endpoint.
///
/// Refreshes the registry gauges (pull model), then renders everything the
/// recorder holds. Returns 503 when no recorder was installed.
async fn prometheus_metrics(State(state): State<AppState>) -> impl IntoResponse {
    let Some(handle) = &state.metrics else {
        return (StatusCode::SERVICE_UNAVAILABLE, "metrics recorder not installed").into_response();
    };

    let counts = state.registry.repository().read(|unit| unit.counts());
    middleware::metrics::record_registry_gauges(counts);

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        handle.render(),
    )
        .into_response()
}

/// Liveness probe — the process is up.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness probe — verifies the application is ready to serve traffic.
async fn readiness(State(state): State<AppState>) -> impl IntoResponse {
    if let Some(pool) = &state.db_pool {
        if let Err(e) = db::ping(pool).await {
            tracing::warn!("Database health check failed: {e}");
            return (StatusCode::SERVICE_UNAVAILABLE, "database unreachable").into_response();
        }
    }

    (StatusCode::OK, "ready").into_response()
}
