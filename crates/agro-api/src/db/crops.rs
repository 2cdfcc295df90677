//! Crop persistence operations.
//!
//! `crop_type` is stored as its canonical name (`SOY`, `CORN`, ...).

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use agro_core::{Crop, CropId, CropType, HarvestId};

/// Insert a new crop.
pub async fn insert(pool: &PgPool, crop: &Crop) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO crops (id, harvest_id, crop_type, planted_area, created_at)
         VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(crop.id.as_uuid())
    .bind(crop.harvest_id.as_uuid())
    .bind(crop.crop_type.as_str())
    .bind(crop.planted_area)
    .bind(crop.created_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Delete a crop.
pub async fn delete(pool: &PgPool, id: CropId) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM crops WHERE id = $1")
        .bind(id.as_uuid())
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Load all crops on startup. Rows with an unrecognized type are skipped.
pub async fn load_all(pool: &PgPool) -> Result<Vec<Crop>, sqlx::Error> {
    let rows = sqlx::query_as::<_, CropRow>(
        "SELECT id, harvest_id, crop_type, planted_area, created_at
         FROM crops ORDER BY created_at, id",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().filter_map(CropRow::into_record).collect())
}

#[derive(sqlx::FromRow)]
struct CropRow {
    id: Uuid,
    harvest_id: Uuid,
    crop_type: String,
    planted_area: f64,
    created_at: DateTime<Utc>,
}

impl CropRow {
    fn into_record(self) -> Option<Crop> {
        let crop_type = match self.crop_type.parse::<CropType>() {
            Ok(crop_type) => crop_type,
            Err(e) => {
                tracing::error!(id = %self.id, error = %e, "skipping crop row with unknown crop_type");
                return None;
            }
        };
        Some(Crop {
            id: CropId::from_uuid(self.id),
            harvest_id: HarvestId::from_uuid(self.harvest_id),
            crop_type,
            planted_area: self.planted_area,
            created_at: self.created_at,
        })
    }
}
