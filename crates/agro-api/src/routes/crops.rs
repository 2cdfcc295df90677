//! # Crop API
//!
//! Crop types are matched case-insensitively and accept the Portuguese
//! names (`SOJA`, `MILHO`, ...) as aliases; responses always use the
//! canonical name.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use agro_core::{Crop, CropId, CropType, HarvestId, NewCrop};

use super::Pagination;
use crate::auth::{require_role, CallerIdentity, Role};
use crate::db::rollback::{settle, settle_delete, Snapshot};
use crate::error::AppError;
use crate::extractors::{extract_validated_json, Validate};
use crate::state::AppState;

/// Request to record a crop planted in a harvest.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateCropRequest {
    pub harvest_id: Uuid,
    /// `SOY`, `CORN`, `COTTON`, `COFFEE` or `SUGARCANE`.
    pub crop_type: String,
    /// Hectares, strictly positive.
    pub planted_area: f64,
}

impl Validate for CreateCropRequest {
    fn validate(&self) -> Result<(), String> {
        if self.crop_type.len() > 32 {
            return Err("crop_type must not exceed 32 characters".to_string());
        }
        Ok(())
    }
}

/// Crop as returned by the API.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CropResponse {
    pub id: Uuid,
    pub harvest_id: Uuid,
    pub crop_type: String,
    pub planted_area: f64,
    pub created_at: DateTime<Utc>,
}

impl From<Crop> for CropResponse {
    fn from(crop: Crop) -> Self {
        Self {
            id: *crop.id.as_uuid(),
            harvest_id: *crop.harvest_id.as_uuid(),
            crop_type: crop.crop_type.as_str().to_string(),
            planted_area: crop.planted_area,
            created_at: crop.created_at,
        }
    }
}

/// Build the crops router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/crops", get(list_crops).post(create_crop))
        .route("/api/crops/{id}", get(get_crop).delete(delete_crop))
        .route("/api/crops/harvest/{harvest_id}", get(list_harvest_crops))
        .route("/api/crops/type/{crop_type}", get(list_crops_by_type))
}

/// GET /api/crops — List crops, paged.
#[utoipa::path(
    get,
    path = "/api/crops",
    params(Pagination),
    responses(
        (status = 200, description = "One page of crops", body = Vec<CropResponse>),
    ),
    tag = "crops"
)]
pub async fn list_crops(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Query(pagination): Query<Pagination>,
) -> Result<Json<Vec<CropResponse>>, AppError> {
    require_role(&caller, Role::Viewer)?;
    let page = pagination.page(state.registry.crops().list_all());
    Ok(Json(page.into_iter().map(Into::into).collect()))
}

/// POST /api/crops — Record a crop.
#[utoipa::path(
    post,
    path = "/api/crops",
    request_body = CreateCropRequest,
    responses(
        (status = 201, description = "Crop recorded", body = CropResponse),
        (status = 404, description = "Harvest not found", body = crate::error::ErrorBody),
        (status = 422, description = "Unknown crop type or invalid area", body = crate::error::ErrorBody),
    ),
    tag = "crops"
)]
pub async fn create_crop(
    State(state): State<AppState>,
    caller: CallerIdentity,
    body: Result<Json<CreateCropRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CropResponse>), AppError> {
    require_role(&caller, Role::Operator)?;
    let req = extract_validated_json(body)?;
    let crop_type: CropType = req.crop_type.parse()?;

    let _gate = state.write_gate.lock().await;
    let crop = state.registry.crops().create(NewCrop {
        harvest_id: HarvestId::from_uuid(req.harvest_id),
        crop_type,
        planted_area: req.planted_area,
    })?;

    if let Some(pool) = &state.db_pool {
        let persisted = crate::db::crops::insert(pool, &crop).await.map(|()| true);
        let before = Snapshot::new_crop(crop.id);
        settle(persisted, "crop", crop.id, before, &state.registry)?;
    }

    Ok((StatusCode::CREATED, Json(crop.into())))
}

/// GET /api/crops/{id} — Get a crop.
#[utoipa::path(
    get,
    path = "/api/crops/{id}",
    params(("id" = Uuid, Path, description = "Crop ID")),
    responses(
        (status = 200, description = "Crop found", body = CropResponse),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
    ),
    tag = "crops"
)]
pub async fn get_crop(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(id): Path<Uuid>,
) -> Result<Json<CropResponse>, AppError> {
    require_role(&caller, Role::Viewer)?;
    let crop = state.registry.crops().get(CropId::from_uuid(id))?;
    Ok(Json(crop.into()))
}

/// GET /api/crops/harvest/{harvest_id} — Crops of one harvest.
#[utoipa::path(
    get,
    path = "/api/crops/harvest/{harvest_id}",
    params(("harvest_id" = Uuid, Path, description = "Harvest ID")),
    responses(
        (status = 200, description = "Crops of the harvest", body = Vec<CropResponse>),
    ),
    tag = "crops"
)]
pub async fn list_harvest_crops(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(harvest_id): Path<Uuid>,
) -> Result<Json<Vec<CropResponse>>, AppError> {
    require_role(&caller, Role::Viewer)?;
    let crops = state
        .registry
        .crops()
        .list_by_harvest(HarvestId::from_uuid(harvest_id));
    Ok(Json(crops.into_iter().map(Into::into).collect()))
}

/// GET /api/crops/type/{crop_type} — Crops of one culture.
#[utoipa::path(
    get,
    path = "/api/crops/type/{crop_type}",
    params(("crop_type" = String, Path, description = "Crop type, e.g. SOY")),
    responses(
        (status = 200, description = "Crops of the type", body = Vec<CropResponse>),
        (status = 422, description = "Unknown crop type", body = crate::error::ErrorBody),
    ),
    tag = "crops"
)]
pub async fn list_crops_by_type(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(crop_type): Path<String>,
) -> Result<Json<Vec<CropResponse>>, AppError> {
    require_role(&caller, Role::Viewer)?;
    let crop_type: CropType = crop_type.parse()?;
    let crops = state.registry.crops().list_by_type(crop_type);
    Ok(Json(crops.into_iter().map(Into::into).collect()))
}

/// DELETE /api/crops/{id} — Delete a crop.
#[utoipa::path(
    delete,
    path = "/api/crops/{id}",
    params(("id" = Uuid, Path, description = "Crop ID")),
    responses(
        (status = 204, description = "Crop deleted"),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
    ),
    tag = "crops"
)]
pub async fn delete_crop(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    require_role(&caller, Role::Operator)?;
    let id = CropId::from_uuid(id);
    let _gate = state.write_gate.lock().await;
    let before = Snapshot::crop(&state.registry, id);
    state.registry.crops().delete(id)?;

    if let Some(pool) = &state.db_pool {
        let persisted = crate::db::crops::delete(pool, id).await;
        settle_delete(persisted, "crop", id, before, &state.registry)?;
    }

    Ok(StatusCode::NO_CONTENT)
}
