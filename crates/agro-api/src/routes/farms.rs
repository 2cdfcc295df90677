//! # Farm API
//!
//! Farm CRUD. Every create and update is checked against the area
//! invariant (`agricultural_area + vegetation_area <= total_area`) on the
//! effective post-update values.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use agro_core::{Farm, FarmId, FarmPatch, NewFarm, ProducerId};

use crate::auth::{require_role, CallerIdentity, Role};
use crate::db::rollback::{settle, settle_delete, Snapshot};
use crate::error::AppError;
use crate::extractors::{check_length, extract_validated_json, Validate};
use crate::state::AppState;

/// Request to register a farm.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateFarmRequest {
    pub producer_id: Uuid,
    pub name: String,
    pub city: String,
    /// Federative unit code, e.g. `SP`.
    pub state: String,
    /// Hectares, strictly positive.
    pub total_area: f64,
    pub agricultural_area: f64,
    pub vegetation_area: f64,
}

impl Validate for CreateFarmRequest {
    fn validate(&self) -> Result<(), String> {
        check_length("name", &self.name)?;
        check_length("city", &self.city)?;
        check_length("state", &self.state)
    }
}

/// Partial farm update. Absent fields are left unchanged; the owning
/// producer cannot be changed.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateFarmRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub total_area: Option<f64>,
    #[serde(default)]
    pub agricultural_area: Option<f64>,
    #[serde(default)]
    pub vegetation_area: Option<f64>,
}

impl Validate for UpdateFarmRequest {
    fn validate(&self) -> Result<(), String> {
        for (field, value) in [
            ("name", &self.name),
            ("city", &self.city),
            ("state", &self.state),
        ] {
            if let Some(value) = value {
                check_length(field, value)?;
            }
        }
        Ok(())
    }
}

/// Filter for the farm listing.
#[derive(Debug, Deserialize, IntoParams)]
pub struct FarmFilter {
    /// Only farms owned by this producer.
    pub producer_id: Option<Uuid>,
}

/// Farm as returned by the API.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct FarmResponse {
    pub id: Uuid,
    pub producer_id: Uuid,
    pub name: String,
    pub city: String,
    pub state: String,
    pub total_area: f64,
    pub agricultural_area: f64,
    pub vegetation_area: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Farm> for FarmResponse {
    fn from(farm: Farm) -> Self {
        Self {
            id: *farm.id.as_uuid(),
            producer_id: *farm.producer_id.as_uuid(),
            name: farm.name,
            city: farm.city,
            state: farm.state,
            total_area: farm.total_area,
            agricultural_area: farm.agricultural_area,
            vegetation_area: farm.vegetation_area,
            created_at: farm.created_at,
            updated_at: farm.updated_at,
        }
    }
}

/// Build the farms router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/farms", get(list_farms).post(create_farm))
        .route(
            "/api/farms/{id}",
            get(get_farm).put(update_farm).delete(delete_farm),
        )
}

/// GET /api/farms — List farms, optionally for one producer.
#[utoipa::path(
    get,
    path = "/api/farms",
    params(FarmFilter),
    responses(
        (status = 200, description = "Farms", body = Vec<FarmResponse>),
    ),
    tag = "farms"
)]
pub async fn list_farms(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Query(filter): Query<FarmFilter>,
) -> Result<Json<Vec<FarmResponse>>, AppError> {
    require_role(&caller, Role::Viewer)?;
    let farms = match filter.producer_id {
        Some(producer_id) => state
            .registry
            .farms()
            .list_by_producer(ProducerId::from_uuid(producer_id)),
        None => state.registry.farms().list_all(),
    };
    Ok(Json(farms.into_iter().map(Into::into).collect()))
}

/// POST /api/farms — Register a farm.
#[utoipa::path(
    post,
    path = "/api/farms",
    request_body = CreateFarmRequest,
    responses(
        (status = 201, description = "Farm registered", body = FarmResponse),
        (status = 404, description = "Producer not found", body = crate::error::ErrorBody),
        (status = 422, description = "Invalid field or area", body = crate::error::ErrorBody),
    ),
    tag = "farms"
)]
pub async fn create_farm(
    State(state): State<AppState>,
    caller: CallerIdentity,
    body: Result<Json<CreateFarmRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<FarmResponse>), AppError> {
    require_role(&caller, Role::Operator)?;
    let req = extract_validated_json(body)?;

    let _gate = state.write_gate.lock().await;
    let farm = state.registry.farms().create(NewFarm {
        producer_id: ProducerId::from_uuid(req.producer_id),
        name: req.name,
        city: req.city,
        state: req.state,
        total_area: req.total_area,
        agricultural_area: req.agricultural_area,
        vegetation_area: req.vegetation_area,
    })?;

    if let Some(pool) = &state.db_pool {
        let persisted = crate::db::farms::insert(pool, &farm).await.map(|()| true);
        let before = Snapshot::new_farm(farm.id);
        settle(persisted, "farm", farm.id, before, &state.registry)?;
    }

    Ok((StatusCode::CREATED, Json(farm.into())))
}

/// GET /api/farms/{id} — Get a farm.
#[utoipa::path(
    get,
    path = "/api/farms/{id}",
    params(("id" = Uuid, Path, description = "Farm ID")),
    responses(
        (status = 200, description = "Farm found", body = FarmResponse),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
    ),
    tag = "farms"
)]
pub async fn get_farm(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(id): Path<Uuid>,
) -> Result<Json<FarmResponse>, AppError> {
    require_role(&caller, Role::Viewer)?;
    let farm = state.registry.farms().get(FarmId::from_uuid(id))?;
    Ok(Json(farm.into()))
}

/// PUT /api/farms/{id} — Partially update a farm.
#[utoipa::path(
    put,
    path = "/api/farms/{id}",
    params(("id" = Uuid, Path, description = "Farm ID")),
    request_body = UpdateFarmRequest,
    responses(
        (status = 200, description = "Farm updated", body = FarmResponse),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
        (status = 422, description = "Invalid field or area", body = crate::error::ErrorBody),
    ),
    tag = "farms"
)]
pub async fn update_farm(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(id): Path<Uuid>,
    body: Result<Json<UpdateFarmRequest>, JsonRejection>,
) -> Result<Json<FarmResponse>, AppError> {
    require_role(&caller, Role::Operator)?;
    let req = extract_validated_json(body)?;

    let id = FarmId::from_uuid(id);
    let _gate = state.write_gate.lock().await;
    let before = Snapshot::farm(&state.registry, id);
    let farm = state.registry.farms().update(
        id,
        FarmPatch {
            name: req.name,
            city: req.city,
            state: req.state,
            total_area: req.total_area,
            agricultural_area: req.agricultural_area,
            vegetation_area: req.vegetation_area,
        },
    )?;

    if let Some(pool) = &state.db_pool {
        let persisted = crate::db::farms::update(pool, &farm).await;
        settle(persisted, "farm", id, before, &state.registry)?;
    }

    Ok(Json(farm.into()))
}

/// DELETE /api/farms/{id} — Delete a farm with its harvests and crops.
#[utoipa::path(
    delete,
    path = "/api/farms/{id}",
    params(("id" = Uuid, Path, description = "Farm ID")),
    responses(
        (status = 204, description = "Farm and dependents deleted"),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
    ),
    tag = "farms"
)]
pub async fn delete_farm(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    require_role(&caller, Role::Operator)?;
    let id = FarmId::from_uuid(id);
    let _gate = state.write_gate.lock().await;
    let before = Snapshot::farm_tree(&state.registry, id);
    state.registry.farms().delete(id)?;

    if let Some(pool) = &state.db_pool {
        let persisted = crate::db::farms::delete(pool, id).await;
        settle_delete(persisted, "farm", id, before, &state.registry)?;
    }

    Ok(StatusCode::NO_CONTENT)
}
