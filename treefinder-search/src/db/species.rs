//! Species persistence
//!
//! Rows are insert-only. A location's rows are written in one transaction
//! so an abandoned search never leaves a partial cache entry.

use crate::models::{NewSpecies, SpeciesRecord};
use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use treefinder_common::{Error, Result};
use uuid::Uuid;

#[async_trait]
pub trait SpeciesStore: Send + Sync {
    /// Species resolved for a location, in their original ranked order
    async fn find_by_location(&self, city: &str, state: &str) -> Result<Vec<SpeciesRecord>>;

    /// Earliest species row carrying `external_id`, from any location
    async fn find_by_external_id(&self, external_id: &str) -> Result<Option<SpeciesRecord>>;

    /// Insert rows atomically, assigning identities
    ///
    /// Rows whose (external_id, city, state) already exists are skipped and
    /// absent from the returned list.
    async fn insert_batch(&self, species: Vec<NewSpecies>) -> Result<Vec<SpeciesRecord>>;

    async fn insert(&self, species: NewSpecies) -> Result<Option<SpeciesRecord>> {
        Ok(self.insert_batch(vec![species]).await?.into_iter().next())
    }
}

#[derive(Debug, Clone)]
pub struct SqliteSpeciesStore {
    pool: SqlitePool,
}

impl SqliteSpeciesStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

const SPECIES_COLUMNS: &str = "guid, external_id, common_name, scientific_name, image_url, \
     habitat_description, max_height, max_age, city, state";

fn species_from_row(row: &SqliteRow) -> Result<SpeciesRecord> {
    let guid: String = row.get("guid");
    let id = Uuid::parse_str(&guid)
        .map_err(|e| Error::Internal(format!("Corrupt species guid {}: {}", guid, e)))?;

    Ok(SpeciesRecord {
        id,
        external_id: row.get("external_id"),
        common_name: row.get("common_name"),
        scientific_name: row.get("scientific_name"),
        image_url: row.get("image_url"),
        habitat_description: row.get("habitat_description"),
        max_height: row.get("max_height"),
        max_age: row.get("max_age"),
        city: row.get("city"),
        state: row.get("state"),
    })
}

#[async_trait]
impl SpeciesStore for SqliteSpeciesStore {
    async fn find_by_location(&self, city: &str, state: &str) -> Result<Vec<SpeciesRecord>> {
        let sql = format!(
            "SELECT {} FROM species WHERE city = ? AND state = ? ORDER BY search_rank, rowid",
            SPECIES_COLUMNS
        );
        let rows = sqlx::query(&sql)
            .bind(city)
            .bind(state)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(species_from_row).collect()
    }

    async fn find_by_external_id(&self, external_id: &str) -> Result<Option<SpeciesRecord>> {
        let sql = format!(
            "SELECT {} FROM species WHERE external_id = ? ORDER BY rowid LIMIT 1",
            SPECIES_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(external_id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(species_from_row).transpose()
    }

    async fn insert_batch(&self, species: Vec<NewSpecies>) -> Result<Vec<SpeciesRecord>> {
        let mut tx = self.pool.begin().await?;
        let mut inserted = Vec::with_capacity(species.len());

        for (rank, new) in species.into_iter().enumerate() {
            let id = Uuid::new_v4();
            let result = sqlx::query(
                r#"
                INSERT INTO species (
                    guid, external_id, common_name, scientific_name, image_url,
                    habitat_description, max_height, max_age, city, state, search_rank
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                ON CONFLICT(external_id, city, state) DO NOTHING
                "#,
            )
            .bind(id.to_string())
            .bind(&new.external_id)
            .bind(&new.common_name)
            .bind(&new.scientific_name)
            .bind(&new.image_url)
            .bind(&new.habitat_description)
            .bind(new.max_height)
            .bind(new.max_age)
            .bind(&new.city)
            .bind(&new.state)
            .bind(rank as i64)
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() == 0 {
                tracing::debug!(
                    external_id = ?new.external_id,
                    city = %new.city,
                    state = %new.state,
                    "Species already stored for location, skipped"
                );
                continue;
            }

            inserted.push(new.into_record(id));
        }

        tx.commit().await?;
        Ok(inserted)
    }
}
