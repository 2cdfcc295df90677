//! Farm persistence operations.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use agro_core::{Farm, FarmId, ProducerId};

/// Insert a new farm.
pub async fn insert(pool: &PgPool, farm: &Farm) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO farms (id, producer_id, name, city, state, total_area,
         agricultural_area, vegetation_area, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
    )
    .bind(farm.id.as_uuid())
    .bind(farm.producer_id.as_uuid())
    .bind(&farm.name)
    .bind(&farm.city)
    .bind(&farm.state)
    .bind(farm.total_area)
    .bind(farm.agricultural_area)
    .bind(farm.vegetation_area)
    .bind(farm.created_at)
    .bind(farm.updated_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Overwrite the mutable columns of an existing farm.
pub async fn update(pool: &PgPool, farm: &Farm) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE farms SET name = $1, city = $2, state = $3, total_area = $4,
         agricultural_area = $5, vegetation_area = $6, updated_at = $7
         WHERE id = $8",
    )
    .bind(&farm.name)
    .bind(&farm.city)
    .bind(&farm.state)
    .bind(farm.total_area)
    .bind(farm.agricultural_area)
    .bind(farm.vegetation_area)
    .bind(farm.updated_at)
    .bind(farm.id.as_uuid())
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Delete a farm and, through the foreign keys, its harvests and crops.
pub async fn delete(pool: &PgPool, id: FarmId) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM farms WHERE id = $1")
        .bind(id.as_uuid())
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Load all farms on startup.
pub async fn load_all(pool: &PgPool) -> Result<Vec<Farm>, sqlx::Error> {
    let rows = sqlx::query_as::<_, FarmRow>(
        "SELECT id, producer_id, name, city, state, total_area, agricultural_area,
         vegetation_area, created_at, updated_at
         FROM farms ORDER BY created_at, id",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(FarmRow::into_record).collect())
}

#[derive(sqlx::FromRow)]
struct FarmRow {
    id: Uuid,
    producer_id: Uuid,
    name: String,
    city: String,
    state: String,
    total_area: f64,
    agricultural_area: f64,
    vegetation_area: f64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl FarmRow {
    fn into_record(self) -> Farm {
        Farm {
            id: FarmId::from_uuid(self.id),
            producer_id: ProducerId::from_uuid(self.producer_id),
            name: self.name,
            city: self.city,
            state: self.state,
            total_area: self.total_area,
            agricultural_area: self.agricultural_area,
            vegetation_area: self.vegetation_area,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}
