//! Database initialization
//!
//! Creates the database file on first run and brings the schema up to
//! date on every startup. All steps are idempotent.

use crate::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::info;

/// Initialize database connection and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // mode=rwc creates the database file when missing
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    // Enable foreign keys
    sqlx::query("PRAGMA foreign_keys = ON")
        .execute(&pool)
        .await?;

    // WAL allows concurrent readers while a request handler writes
    sqlx::query("PRAGMA journal_mode = WAL")
        .execute(&pool)
        .await?;

    // Wait on locks instead of failing immediately
    sqlx::query("PRAGMA busy_timeout = 5000")
        .execute(&pool)
        .await?;

    apply_schema(&pool).await?;

    Ok(pool)
}

/// Create tables and run migrations on an open pool.
///
/// Split out from [`init_database`] so tests can install the schema on
/// in-memory databases.
pub async fn apply_schema(pool: &SqlitePool) -> Result<()> {
    create_schema_version_table(pool).await?;
    create_tours_table(pool).await?;

    crate::db::migrations::run_migrations(pool).await?;

    Ok(())
}

async fn create_schema_version_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_tours_table(pool: &SqlitePool) -> Result<()> {
    // price holds the canonical two-decimal-place rendering of a
    // fixed-point amount; see db::tours::parse_price
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS tours (
            guid TEXT PRIMARY KEY,
            origin_country TEXT NOT NULL,
            destination_country TEXT NOT NULL,
            price TEXT NOT NULL,
            duration INTEGER NOT NULL,
            description TEXT NOT NULL,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
