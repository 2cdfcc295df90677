//! # Harvest API
//!
//! Harvests are created and deleted, never edited.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use agro_core::{FarmId, Harvest, HarvestId, NewHarvest};

use super::Pagination;
use crate::auth::{require_role, CallerIdentity, Role};
use crate::db::rollback::{settle, settle_delete, Snapshot};
use crate::error::AppError;
use crate::extractors::{check_length, extract_validated_json, Validate};
use crate::state::AppState;

/// Request to open a harvest on a farm.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateHarvestRequest {
    pub farm_id: Uuid,
    pub year: i32,
    /// Free-text label, e.g. "Safra 2024".
    pub description: String,
}

impl Validate for CreateHarvestRequest {
    fn validate(&self) -> Result<(), String> {
        check_length("description", &self.description)
    }
}

/// Harvest as returned by the API.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HarvestResponse {
    pub id: Uuid,
    pub farm_id: Uuid,
    pub year: i32,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

impl From<Harvest> for HarvestResponse {
    fn from(harvest: Harvest) -> Self {
        Self {
            id: *harvest.id.as_uuid(),
            farm_id: *harvest.farm_id.as_uuid(),
            year: harvest.year,
            description: harvest.description,
            created_at: harvest.created_at,
        }
    }
}

/// Build the harvests router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/harvests", get(list_harvests).post(create_harvest))
        .route(
            "/api/harvests/{id}",
            get(get_harvest).delete(delete_harvest),
        )
        .route("/api/harvests/farm/{farm_id}", get(list_farm_harvests))
}

/// GET /api/harvests — List harvests, paged.
#[utoipa::path(
    get,
    path = "/api/harvests",
    params(Pagination),
    responses(
        (status = 200, description = "One page of harvests", body = Vec<HarvestResponse>),
    ),
    tag = "harvests"
)]
pub async fn list_harvests(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Query(pagination): Query<Pagination>,
) -> Result<Json<Vec<HarvestResponse>>, AppError> {
    require_role(&caller, Role::Viewer)?;
    let page = pagination.page(state.registry.harvests().list_all());
    Ok(Json(page.into_iter().map(Into::into).collect()))
}

/// POST /api/harvests — Open a harvest.
#[utoipa::path(
    post,
    path = "/api/harvests",
    request_body = CreateHarvestRequest,
    responses(
        (status = 201, description = "Harvest created", body = HarvestResponse),
        (status = 404, description = "Farm not found", body = crate::error::ErrorBody),
        (status = 422, description = "Blank description", body = crate::error::ErrorBody),
    ),
    tag = "harvests"
)]
pub async fn create_harvest(
    State(state): State<AppState>,
    caller: CallerIdentity,
    body: Result<Json<CreateHarvestRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<HarvestResponse>), AppError> {
    require_role(&caller, Role::Operator)?;
    let req = extract_validated_json(body)?;

    let _gate = state.write_gate.lock().await;
    let harvest = state.registry.harvests().create(NewHarvest {
        farm_id: FarmId::from_uuid(req.farm_id),
        year: req.year,
        description: req.description,
    })?;

    if let Some(pool) = &state.db_pool {
        let persisted = crate::db::harvests::insert(pool, &harvest).await.map(|()| true);
        let before = Snapshot::new_harvest(harvest.id);
        settle(persisted, "harvest", harvest.id, before, &state.registry)?;
    }

    Ok((StatusCode::CREATED, Json(harvest.into())))
}

/// GET /api/harvests/{id} — Get a harvest.
#[utoipa::path(
    get,
    path = "/api/harvests/{id}",
    params(("id" = Uuid, Path, description = "Harvest ID")),
    responses(
        (status = 200, description = "Harvest found", body = HarvestResponse),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
    ),
    tag = "harvests"
)]
pub async fn get_harvest(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(id): Path<Uuid>,
) -> Result<Json<HarvestResponse>, AppError> {
    require_role(&caller, Role::Viewer)?;
    let harvest = state.registry.harvests().get(HarvestId::from_uuid(id))?;
    Ok(Json(harvest.into()))
}

/// GET /api/harvests/farm/{farm_id} — Harvests of one farm.
#[utoipa::path(
    get,
    path = "/api/harvests/farm/{farm_id}",
    params(("farm_id" = Uuid, Path, description = "Farm ID")),
    responses(
        (status = 200, description = "Harvests of the farm", body = Vec<HarvestResponse>),
    ),
    tag = "harvests"
)]
pub async fn list_farm_harvests(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(farm_id): Path<Uuid>,
) -> Result<Json<Vec<HarvestResponse>>, AppError> {
    require_role(&caller, Role::Viewer)?;
    let harvests = state
        .registry
        .harvests()
        .list_by_farm(FarmId::from_uuid(farm_id));
    Ok(Json(harvests.into_iter().map(Into::into).collect()))
}

/// DELETE /api/harvests/{id} — Delete a harvest with its crops.
#[utoipa::path(
    delete,
    path = "/api/harvests/{id}",
    params(("id" = Uuid, Path, description = "Harvest ID")),
    responses(
        (status = 204, description = "Harvest and crops deleted"),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
    ),
    tag = "harvests"
)]
pub async fn delete_harvest(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    require_role(&caller, Role::Operator)?;
    let id = HarvestId::from_uuid(id);
    let _gate = state.write_gate.lock().await;
    let before = Snapshot::harvest_tree(&state.registry, id);
    state.registry.harvests().delete(id)?;

    if let Some(pool) = &state.db_pool {
        let persisted = crate::db::harvests::delete(pool, id).await;
        settle_delete(persisted, "harvest", id, before, &state.registry)?;
    }

    Ok(StatusCode::NO_CONTENT)
}
