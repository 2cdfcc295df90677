//! # Dashboard API
//!
//! Read-only aggregations computed on demand from the live registry.
//! Nothing is cached; every call reflects all committed mutations.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use agro_registry::{CropShare, DashboardSummary, LandUse, StateShare};

use crate::auth::{require_role, CallerIdentity, Role};
use crate::error::AppError;
use crate::state::AppState;

/// Farm count and summed area.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SummaryResponse {
    pub total_farms: usize,
    /// Hectares.
    pub total_area: f64,
}

impl From<DashboardSummary> for SummaryResponse {
    fn from(summary: DashboardSummary) -> Self {
        Self {
            total_farms: summary.total_farms,
            total_area: summary.total_area,
        }
    }
}

/// Farms in one state.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StateShareResponse {
    pub state: String,
    pub count: usize,
    /// Share of all farms, 0–100.
    pub percentage: f64,
}

impl From<StateShare> for StateShareResponse {
    fn from(share: StateShare) -> Self {
        Self {
            state: share.state,
            count: share.count,
            percentage: share.percentage,
        }
    }
}

/// Planted area of one culture.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CropShareResponse {
    pub crop_type: String,
    pub total_area: f64,
    /// Share of all planted area, 0–100.
    pub percentage: f64,
}

impl From<CropShare> for CropShareResponse {
    fn from(share: CropShare) -> Self {
        Self {
            crop_type: share.crop_type.as_str().to_string(),
            total_area: share.total_area,
            percentage: share.percentage,
        }
    }
}

/// Agricultural versus preserved vegetation across every farm.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LandUseResponse {
    pub agricultural_area: f64,
    pub vegetation_area: f64,
    pub agricultural_percentage: f64,
    pub vegetation_percentage: f64,
}

impl From<LandUse> for LandUseResponse {
    fn from(land: LandUse) -> Self {
        Self {
            agricultural_area: land.agricultural_area,
            vegetation_area: land.vegetation_area,
            agricultural_percentage: land.agricultural_percentage,
            vegetation_percentage: land.vegetation_percentage,
        }
    }
}

/// Build the dashboard router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/dashboard/summary", get(summary))
        .route("/api/dashboard/by-state", get(by_state))
        .route("/api/dashboard/by-crop", get(by_crop))
        .route("/api/dashboard/land-use", get(land_use))
}

/// GET /api/dashboard/summary
#[utoipa::path(
    get,
    path = "/api/dashboard/summary",
    responses((status = 200, description = "Farm count and total area", body = SummaryResponse)),
    tag = "dashboard"
)]
pub async fn summary(
    State(state): State<AppState>,
    caller: CallerIdentity,
) -> Result<Json<SummaryResponse>, AppError> {
    require_role(&caller, Role::Viewer)?;
    Ok(Json(state.registry.analytics().summary().into()))
}

/// GET /api/dashboard/by-state
#[utoipa::path(
    get,
    path = "/api/dashboard/by-state",
    responses((status = 200, description = "Farm distribution by state", body = Vec<StateShareResponse>)),
    tag = "dashboard"
)]
pub async fn by_state(
    State(state): State<AppState>,
    caller: CallerIdentity,
) -> Result<Json<Vec<StateShareResponse>>, AppError> {
    require_role(&caller, Role::Viewer)?;
    let shares = state.registry.analytics().by_state();
    Ok(Json(shares.into_iter().map(Into::into).collect()))
}

/// GET /api/dashboard/by-crop
#[utoipa::path(
    get,
    path = "/api/dashboard/by-crop",
    responses((status = 200, description = "Planted area by crop type", body = Vec<CropShareResponse>)),
    tag = "dashboard"
)]
pub async fn by_crop(
    State(state): State<AppState>,
    caller: CallerIdentity,
) -> Result<Json<Vec<CropShareResponse>>, AppError> {
    require_role(&caller, Role::Viewer)?;
    let shares = state.registry.analytics().by_crop();
    Ok(Json(shares.into_iter().map(Into::into).collect()))
}

/// GET /api/dashboard/land-use
#[utoipa::path(
    get,
    path = "/api/dashboard/land-use",
    responses((status = 200, description = "Agricultural vs vegetation area", body = LandUseResponse)),
    tag = "dashboard"
)]
pub async fn land_use(
    State(state): State<AppState>,
    caller: CallerIdentity,
) -> Result<Json<LandUseResponse>, AppError> {
    require_role(&caller, Role::Viewer)?;
    Ok(Json(state.registry.analytics().land_use().into()))
}
