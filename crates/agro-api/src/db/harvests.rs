//! Harvest persistence operations.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use agro_core::{FarmId, Harvest, HarvestId};

/// Insert a new harvest.
pub async fn insert(pool: &PgPool, harvest: &Harvest) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO harvests (id, farm_id, year, description, created_at)
         VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(harvest.id.as_uuid())
    .bind(harvest.farm_id.as_uuid())
    .bind(harvest.year)
    .bind(&harvest.description)
    .bind(harvest.created_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Delete a harvest and, through the foreign key, its crops.
pub async fn delete(pool: &PgPool, id: HarvestId) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM harvests WHERE id = $1")
        .bind(id.as_uuid())
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Load all harvests on startup.
pub async fn load_all(pool: &PgPool) -> Result<Vec<Harvest>, sqlx::Error> {
    let rows = sqlx::query_as::<_, HarvestRow>(
        "SELECT id, farm_id, year, description, created_at
         FROM harvests ORDER BY created_at, id",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(HarvestRow::into_record).collect())
}

#[derive(sqlx::FromRow)]
struct HarvestRow {
    id: Uuid,
    farm_id: Uuid,
    year: i32,
    description: String,
    created_at: DateTime<Utc>,
}

impl HarvestRow {
    fn into_record(self) -> Harvest {
        Harvest {
            id: HarvestId::from_uuid(self.id),
            farm_id: FarmId::from_uuid(self.farm_id),
            year: self.year,
            description: self.description,
            created_at: self.created_at,
        }
    }
}
