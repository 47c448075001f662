//! Database schema and migrations.

use super::{DbError, DbPool};
use tracing::info;

/// The SQLite schema source, embedded for use in NL-to-SQL prompts.
///
/// The natural-language translator sends this text to the model so that
/// generated queries reference real tables and columns.
pub const SCHEMA_SQL: &str = include_str!("migrations/sqlite/0001_initial_schema.sql");

/// Runs database migrations for the pool's backend.
pub async fn run_migrations(pool: &DbPool) -> Result<(), DbError> {
    match pool {
        DbPool::Sqlite(pool) => {
            info!("Running SQLite migrations");
            sqlx::migrate!("src/db/migrations/sqlite").run(pool).await?;
        }
        DbPool::Postgres(pool) => {
            info!("Running PostgreSQL migrations");
            sqlx::migrate!("src/db/migrations/postgres")
                .run(pool)
                .await?;
        }
    }

    info!("Migrations completed");
    Ok(())
}
