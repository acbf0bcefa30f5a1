//! Database schema migrations
//!
//! Versioned schema migrations allowing seamless database upgrades
//! without manual deletion or data loss.
//!
//! # Migration Guidelines
//!
//! 1. **Never modify existing migrations** - They must remain stable for users upgrading from older versions
//! 2. **Always add new migrations** - Create a new migration function for each schema change
//! 3. **Use ALTER TABLE / CREATE INDEX IF NOT EXISTS** - Prefer additive changes that preserve data

use crate::Result;
use sqlx::SqlitePool;
use tracing::{info, warn};

/// Current schema version
///
/// **IMPORTANT:** Increment this when adding new migrations
pub const CURRENT_SCHEMA_VERSION: i32 = 2;

/// Get current schema version from database
///
/// Returns 0 if schema_version table doesn't exist or has no rows
async fn get_schema_version(pool: &SqlitePool) -> Result<i32> {
    let table_exists: bool = sqlx::query_scalar(
        r#"
        SELECT EXISTS(
            SELECT 1 FROM sqlite_master
            WHERE type='table' AND name='schema_version'
        )
        "#,
    )
    .fetch_one(pool)
    .await?;

    if !table_exists {
        return Ok(0);
    }

    let version: Option<i32> = sqlx::query_scalar(
        "SELECT version FROM schema_version ORDER BY version DESC LIMIT 1",
    )
    .fetch_optional(pool)
    .await?;

    Ok(version.unwrap_or(0))
}

/// Set schema version in database
async fn set_schema_version(pool: &SqlitePool, version: i32) -> Result<()> {
    sqlx::query("INSERT INTO schema_version (version) VALUES (?)")
        .bind(version)
        .execute(pool)
        .await?;

    Ok(())
}

/// Run all pending migrations
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    let current_version = get_schema_version(pool).await?;

    if current_version == CURRENT_SCHEMA_VERSION {
        info!("Database schema is up to date (v{})", current_version);
        return Ok(());
    }

    if current_version > CURRENT_SCHEMA_VERSION {
        warn!(
            "Database schema version ({}) is newer than code version ({})",
            current_version, CURRENT_SCHEMA_VERSION
        );
        warn!("This may indicate a downgrade. Proceeding with caution.");
        return Ok(());
    }

    info!(
        "Running database migrations: v{} -> v{}",
        current_version, CURRENT_SCHEMA_VERSION
    );

    // Run migrations sequentially
    if current_version < 1 {
        migrate_v1(pool).await?;
        set_schema_version(pool, 1).await?;
        info!("✓ Migration v1 completed");
    }

    if current_version < 2 {
        migrate_v2(pool).await?;
        set_schema_version(pool, 2).await?;
        info!("✓ Migration v2 completed");
    }

    info!("All migrations completed successfully");
    Ok(())
}

/// Migration v1: Index tours on created_at
///
/// **Background:** Listing returns newest tours first. Early databases had
/// no index for that ordering, forcing a full scan and sort per request.
async fn migrate_v1(pool: &SqlitePool) -> Result<()> {
    info!("Running migration v1: Index tours on created_at");

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_tours_created_at ON tours (created_at DESC)")
        .execute(pool)
        .await?;

    Ok(())
}

/// Migration v2: Index tours on origin/destination country
///
/// **Background:** The list endpoint filters by origin and destination
/// country. A composite index covers both the single-country and the
/// full-route filter.
async fn migrate_v2(pool: &SqlitePool) -> Result<()> {
    info!("Running migration v2: Index tours on origin/destination country");

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_tours_route ON tours (origin_country, destination_country)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn setup_pool() -> SqlitePool {
        // One connection so every query sees the same in-memory database
        SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("Failed to create in-memory database")
    }

    #[tokio::test]
    async fn test_version_zero_before_init() {
        let pool = setup_pool().await;
        let version = get_schema_version(&pool).await.unwrap();
        assert_eq!(version, 0);
    }

    #[tokio::test]
    async fn test_migrations_reach_current_version() {
        let pool = setup_pool().await;
        crate::db::init::apply_schema(&pool).await.unwrap();

        let version = get_schema_version(&pool).await.unwrap();
        assert_eq!(version, CURRENT_SCHEMA_VERSION);
    }

    #[tokio::test]
    async fn test_migrations_are_idempotent() {
        let pool = setup_pool().await;
        crate::db::init::apply_schema(&pool).await.unwrap();

        // Second run must be a no-op, not an error
        run_migrations(&pool).await.unwrap();

        let version = get_schema_version(&pool).await.unwrap();
        assert_eq!(version, CURRENT_SCHEMA_VERSION);
    }

    #[tokio::test]
    async fn test_route_index_created() {
        let pool = setup_pool().await;
        crate::db::init::apply_schema(&pool).await.unwrap();

        let index_exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='index' AND name='idx_tours_route')",
        )
        .fetch_one(&pool)
        .await
        .unwrap();

        assert!(index_exists);
    }
}
