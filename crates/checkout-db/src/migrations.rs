//! # Database Migrations
//!
//! The schema lives in `migrations/sqlite/` at the workspace root and is
//! embedded at compile time.
//!
//! ```text
//! Database::new
//!      │
//!      ▼
//! _sqlx_migrations present? ── no ──► create it
//!      │
//!      ▼
//! 001_initial_schema.sql   products, transactions, transaction_items
//! 002_transaction_tax_rate  transactions.tax_rate_bps
//!      │
//!      ▼
//! record checksum, continue startup
//! ```
//!
//! Existing migrations are never edited; schema changes get a new numbered file.

use sqlx::SqlitePool;
use tracing::info;

use crate::error::DbResult;

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations/sqlite");

/// Runs all pending database migrations. Safe to call repeatedly.
pub async fn run_migrations(pool: &SqlitePool) -> DbResult<()> {
    info!("Checking for pending migrations");

    MIGRATOR.run(pool).await?;

    info!("All migrations applied successfully");
    Ok(())
}

/// Returns `(embedded, applied)` migration counts.
///
/// `applied > embedded` means the file was migrated by a newer build.
pub async fn migration_status(pool: &SqlitePool) -> DbResult<(usize, usize)> {
    let total = MIGRATOR.migrations.len();

    let applied: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations WHERE success")
        .fetch_one(pool)
        .await?;

    Ok((total, usize::try_from(applied).unwrap_or(0)))
}
