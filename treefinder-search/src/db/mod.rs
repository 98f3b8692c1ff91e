//! Database access for treefinder-search
//!
//! SQLite via sqlx; the `species` table doubles as the location-scoped
//! result cache and the cross-location dedup index.

pub mod species;

pub use species::{SpeciesStore, SqliteSpeciesStore};

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::str::FromStr;
use treefinder_common::Result;

/// Open (creating if needed) the database file and ensure the schema exists
pub async fn init_database_pool(db_path: &Path) -> Result<SqlitePool> {
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // mode=rwc: read, write, create
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    tracing::debug!("Connecting to database: {}", db_url);

    let options = SqliteConnectOptions::from_str(&db_url)?
        .busy_timeout(std::time::Duration::from_secs(5));
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    init_tables(&pool).await?;

    Ok(pool)
}

/// Single-connection in-memory database with the schema applied
///
/// One connection only: every `sqlite::memory:` connection is its own database.
pub async fn init_memory_pool() -> Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await?;
    init_tables(&pool).await?;
    Ok(pool)
}

/// Create tables and indexes if they don't exist
pub async fn init_tables(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS species (
            guid TEXT PRIMARY KEY,
            external_id TEXT,
            common_name TEXT NOT NULL,
            scientific_name TEXT NOT NULL,
            image_url TEXT,
            habitat_description TEXT NOT NULL,
            max_height REAL,
            max_age REAL,
            city TEXT NOT NULL COLLATE NOCASE,
            state TEXT NOT NULL COLLATE NOCASE,
            search_rank INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_species_external_location \
         ON species (external_id, city, state)",
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_species_location ON species (city, state)")
        .execute(pool)
        .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_species_external_id ON species (external_id)")
        .execute(pool)
        .await?;

    tracing::info!("Database tables initialized (species)");

    Ok(())
}
