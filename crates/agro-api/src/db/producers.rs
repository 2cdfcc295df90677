//! Producer persistence operations.
//!
//! All functions take a `&PgPool` and operate on the `producers` table.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use agro_core::{Document, Producer, ProducerId};

/// Insert a new producer.
pub async fn insert(pool: &PgPool, producer: &Producer) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO producers (id, document, name, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(producer.id.as_uuid())
    .bind(producer.document.as_str())
    .bind(&producer.name)
    .bind(producer.created_at)
    .bind(producer.updated_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Overwrite the mutable columns of an existing producer.
pub async fn update(pool: &PgPool, producer: &Producer) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE producers SET document = $1, name = $2, updated_at = $3 WHERE id = $4",
    )
    .bind(producer.document.as_str())
    .bind(&producer.name)
    .bind(producer.updated_at)
    .bind(producer.id.as_uuid())
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Delete a producer. Farms, harvests and crops go with it.
pub async fn delete(pool: &PgPool, id: ProducerId) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM producers WHERE id = $1")
        .bind(id.as_uuid())
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Load all producers on startup.
pub async fn load_all(pool: &PgPool) -> Result<Vec<Producer>, sqlx::Error> {
    let rows = sqlx::query_as::<_, ProducerRow>(
        "SELECT id, document, name, created_at, updated_at
         FROM producers ORDER BY created_at, id",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().filter_map(ProducerRow::into_record).collect())
}

#[derive(sqlx::FromRow)]
struct ProducerRow {
    id: Uuid,
    document: String,
    name: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ProducerRow {
    fn into_record(self) -> Option<Producer> {
        let document = match Document::parse(&self.document) {
            Ok(document) => document,
            Err(e) => {
                tracing::error!(id = %self.id, error = %e, "skipping producer row with invalid document");
                return None;
            }
        };
        Some(Producer {
            id: ProducerId::from_uuid(self.id),
            document,
            name: self.name,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}
