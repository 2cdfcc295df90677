//! # OpenAPI Specification Assembly
//!
//! Assembles all utoipa-documented routes into a single OpenAPI spec,
//! served at `/openapi.json`.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::state::AppState;

/// Adds the Bearer token security scheme to the OpenAPI spec.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .description(Some(
                            "Static bearer secret, optionally role-prefixed \
                             (`viewer:`, `operator:`, `admin:`). Set via AUTH_TOKEN.",
                        ))
                        .build(),
                ),
            );
        }
    }
}

/// Assembled OpenAPI spec for the entire API surface.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Agro Registry API",
        version = "0.1.0",
        description = "Rural producer registry: producers identified by CPF/CNPJ, their farms, harvests and crops, plus dashboard analytics.\n\nAuthentication: Bearer token via `Authorization: Bearer <token>` header. Health probes (`/health/*`) and `/metrics` are unauthenticated."
    ),
    servers(
        (url = "http://localhost:8000", description = "Local development server"),
    ),
    security(
        ("bearer_auth" = [])
    ),
    paths(
        // ── Producers ────────────────────────────────────────────────────
        crate::routes::producers::list_producers,
        crate::routes::producers::create_producer,
        crate::routes::producers::get_producer,
        crate::routes::producers::update_producer,
        crate::routes::producers::delete_producer,
        // ── Farms ────────────────────────────────────────────────────────
        crate::routes::farms::list_farms,
        crate::routes::farms::create_farm,
        crate::routes::farms::get_farm,
        crate::routes::farms::update_farm,
        crate::routes::farms::delete_farm,
        // ── Harvests ─────────────────────────────────────────────────────
        crate::routes::harvests::list_harvests,
        crate::routes::harvests::create_harvest,
        crate::routes::harvests::get_harvest,
        crate::routes::harvests::list_farm_harvests,
        crate::routes::harvests::delete_harvest,
        // ── Crops ────────────────────────────────────────────────────────
        crate::routes::crops::list_crops,
        crate::routes::crops::create_crop,
        crate::routes::crops::get_crop,
        crate::routes::crops::list_harvest_crops,
        crate::routes::crops::list_crops_by_type,
        crate::routes::crops::delete_crop,
        // ── Dashboard ────────────────────────────────────────────────────
        crate::routes::dashboard::summary,
        crate::routes::dashboard::by_state,
        crate::routes::dashboard::by_crop,
        crate::routes::dashboard::land_use,
    ),
    components(
        schemas(
            crate::error::ErrorBody,
            crate::error::ErrorDetail,
            crate::auth::Role,
            crate::routes::producers::CreateProducerRequest,
            crate::routes::producers::UpdateProducerRequest,
            crate::routes::producers::ProducerResponse,
            crate::routes::farms::CreateFarmRequest,
            crate::routes::farms::UpdateFarmRequest,
            crate::routes::farms::FarmResponse,
            crate::routes::harvests::CreateHarvestRequest,
            crate::routes::harvests::HarvestResponse,
            crate::routes::crops::CreateCropRequest,
            crate::routes::crops::CropResponse,
            crate::routes::dashboard::SummaryResponse,
            crate::routes::dashboard::StateShareResponse,
            crate::routes::dashboard::CropShareResponse,
            crate::routes::dashboard::LandUseResponse,
        ),
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "producers", description = "Rural producers identified by CPF or CNPJ"),
        (name = "farms", description = "Farms with the agricultural + vegetation <= total area rule"),
        (name = "harvests", description = "Harvest seasons of a farm"),
        (name = "crops", description = "Crops planted in a harvest"),
        (name = "dashboard", description = "Aggregations over the live dataset"),
    )
)]
pub struct ApiDoc;

/// Build the OpenAPI router.
pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(openapi_json))
}

/// GET /openapi.json — Return the generated OpenAPI specification.
async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
