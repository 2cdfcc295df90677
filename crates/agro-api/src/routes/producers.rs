//! # Producer API
//!
//! Producer registration and maintenance. Documents are accepted with or
//! without punctuation; responses carry both the stored digits and the
//! punctuated rendering.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use agro_core::{NewProducer, Producer, ProducerId, ProducerPatch};

use crate::auth::{require_role, CallerIdentity, Role};
use crate::db::rollback::{settle, settle_delete, Snapshot};
use crate::error::AppError;
use crate::extractors::{check_length, extract_validated_json, Validate};
use crate::state::AppState;

/// Request to register a producer.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateProducerRequest {
    /// Producer name.
    pub name: String,
    /// CPF or CNPJ, punctuation optional.
    pub document: String,
}

impl Validate for CreateProducerRequest {
    fn validate(&self) -> Result<(), String> {
        check_length("name", &self.name)?;
        check_length("document", &self.document)
    }
}

/// Partial producer update. Absent fields are left unchanged.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateProducerRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub document: Option<String>,
}

impl Validate for UpdateProducerRequest {
    fn validate(&self) -> Result<(), String> {
        if let Some(name) = &self.name {
            check_length("name", name)?;
        }
        if let Some(document) = &self.document {
            check_length("document", document)?;
        }
        Ok(())
    }
}

/// Producer as returned by the API.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProducerResponse {
    pub id: Uuid,
    /// Document digits.
    pub document: String,
    /// Punctuated document (`NNN.NNN.NNN-NN` or `NN.NNN.NNN/NNNN-NN`).
    pub document_formatted: String,
    /// `CPF` or `CNPJ`.
    pub document_type: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Producer> for ProducerResponse {
    fn from(producer: Producer) -> Self {
        Self {
            id: *producer.id.as_uuid(),
            document: producer.document.as_str().to_string(),
            document_formatted: producer.document.formatted(),
            document_type: producer.document.kind().as_str().to_string(),
            name: producer.name,
            created_at: producer.created_at,
            updated_at: producer.updated_at,
        }
    }
}

/// Build the producers router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/producers", get(list_producers).post(create_producer))
        .route(
            "/api/producers/{id}",
            get(get_producer)
                .put(update_producer)
                .delete(delete_producer),
        )
}

/// GET /api/producers — List producers, oldest first.
#[utoipa::path(
    get,
    path = "/api/producers",
    responses(
        (status = 200, description = "All producers", body = Vec<ProducerResponse>),
    ),
    tag = "producers"
)]
pub async fn list_producers(
    State(state): State<AppState>,
    caller: CallerIdentity,
) -> Result<Json<Vec<ProducerResponse>>, AppError> {
    require_role(&caller, Role::Viewer)?;
    let producers = state.registry.producers().list();
    Ok(Json(producers.into_iter().map(Into::into).collect()))
}

/// POST /api/producers — Register a producer.
#[utoipa::path(
    post,
    path = "/api/producers",
    request_body = CreateProducerRequest,
    responses(
        (status = 201, description = "Producer registered", body = ProducerResponse),
        (status = 409, description = "Document already registered", body = crate::error::ErrorBody),
        (status = 422, description = "Invalid document or name", body = crate::error::ErrorBody),
    ),
    tag = "producers"
)]
pub async fn create_producer(
    State(state): State<AppState>,
    caller: CallerIdentity,
    body: Result<Json<CreateProducerRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ProducerResponse>), AppError> {
    require_role(&caller, Role::Operator)?;
    let req = extract_validated_json(body)?;

    let _gate = state.write_gate.lock().await;
    let producer = state.registry.producers().create(NewProducer {
        name: req.name,
        document: req.document,
    })?;

    if let Some(pool) = &state.db_pool {
        let persisted = crate::db::producers::insert(pool, &producer).await.map(|()| true);
        let before = Snapshot::new_producer(producer.id);
        settle(persisted, "producer", producer.id, before, &state.registry)?;
    }

    Ok((StatusCode::CREATED, Json(producer.into())))
}

/// GET /api/producers/{id} — Get a producer.
#[utoipa::path(
    get,
    path = "/api/producers/{id}",
    params(("id" = Uuid, Path, description = "Producer ID")),
    responses(
        (status = 200, description = "Producer found", body = ProducerResponse),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
    ),
    tag = "producers"
)]
pub async fn get_producer(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(id): Path<Uuid>,
) -> Result<Json<ProducerResponse>, AppError> {
    require_role(&caller, Role::Viewer)?;
    let producer = state.registry.producers().get(ProducerId::from_uuid(id))?;
    Ok(Json(producer.into()))
}

/// PUT /api/producers/{id} — Update a producer's name and/or document.
#[utoipa::path(
    put,
    path = "/api/producers/{id}",
    params(("id" = Uuid, Path, description = "Producer ID")),
    request_body = UpdateProducerRequest,
    responses(
        (status = 200, description = "Producer updated", body = ProducerResponse),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
        (status = 409, description = "Document already registered", body = crate::error::ErrorBody),
        (status = 422, description = "Invalid document or name", body = crate::error::ErrorBody),
    ),
    tag = "producers"
)]
pub async fn update_producer(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(id): Path<Uuid>,
    body: Result<Json<UpdateProducerRequest>, JsonRejection>,
) -> Result<Json<ProducerResponse>, AppError> {
    require_role(&caller, Role::Operator)?;
    let req = extract_validated_json(body)?;

    let id = ProducerId::from_uuid(id);
    let _gate = state.write_gate.lock().await;
    let before = Snapshot::producer(&state.registry, id);
    let producer = state.registry.producers().update(
        id,
        ProducerPatch {
            name: req.name,
            document: req.document,
        },
    )?;

    if let Some(pool) = &state.db_pool {
        let persisted = crate::db::producers::update(pool, &producer).await;
        settle(persisted, "producer", id, before, &state.registry)?;
    }

    Ok(Json(producer.into()))
}

/// DELETE /api/producers/{id} — Delete a producer with all its farms,
/// harvests and crops.
#[utoipa::path(
    delete,
    path = "/api/producers/{id}",
    params(("id" = Uuid, Path, description = "Producer ID")),
    responses(
        (status = 204, description = "Producer and dependents deleted"),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
    ),
    tag = "producers"
)]
pub async fn delete_producer(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    require_role(&caller, Role::Operator)?;
    let id = ProducerId::from_uuid(id);
    let _gate = state.write_gate.lock().await;
    let before = Snapshot::producer_tree(&state.registry, id);
    state.registry.producers().delete(id)?;

    if let Some(pool) = &state.db_pool {
        let persisted = crate::db::producers::delete(pool, id).await;
        settle_delete(persisted, "producer", id, before, &state.registry)?;
    }

    Ok(StatusCode::NO_CONTENT)
}
