//! Guarded execution of translated queries.
//!
//! Result cells are stringified because the shape of a translated query is
//! unknown at compile time; clients render the grid as-is.

use super::{guard, NlqError};
use crate::db::{DbError, DbPool};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{postgres::PgRow, sqlite::SqliteRow, Column, Row};

/// Columns and stringified rows from a guarded query.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryResults {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Runs `sql` after it passes the read-only guard.
pub async fn execute_readonly(pool: &DbPool, sql: &str) -> Result<QueryResults, NlqError> {
    guard::ensure_read_only(sql)?;

    match pool {
        DbPool::Sqlite(p) => {
            let rows = sqlx::query(sql)
                .fetch_all(p)
                .await
                .map_err(DbError::from)?;
            Ok(collect_results(&rows, sqlite_cell))
        }
        DbPool::Postgres(p) => {
            let rows = sqlx::query(sql)
                .fetch_all(p)
                .await
                .map_err(DbError::from)?;
            Ok(collect_results(&rows, postgres_cell))
        }
    }
}

fn collect_results<R: Row>(rows: &[R], cell: fn(&R, usize) -> String) -> QueryResults {
    let columns = rows
        .first()
        .map(|row| {
            row.columns()
                .iter()
                .map(|c| c.name().to_string())
                .collect()
        })
        .unwrap_or_default();

    let rows = rows
        .iter()
        .map(|row| (0..row.columns().len()).map(|i| cell(row, i)).collect())
        .collect();

    QueryResults { columns, rows }
}

/// Stringifies one SQLite cell. SQLite values carry their own type, so the
/// decode attempts are tried from most to least specific.
fn sqlite_cell(row: &SqliteRow, idx: usize) -> String {
    if let Ok(value) = row.try_get::<Option<i64>, _>(idx) {
        return value.map(|v| v.to_string()).unwrap_or_default();
    }
    if let Ok(value) = row.try_get::<Option<f64>, _>(idx) {
        return value.map(|v| v.to_string()).unwrap_or_default();
    }
    if let Ok(value) = row.try_get::<Option<String>, _>(idx) {
        return value.unwrap_or_default();
    }
    if let Ok(value) = row.try_get::<Option<bool>, _>(idx) {
        return value.map(|v| v.to_string()).unwrap_or_default();
    }
    String::new()
}

/// Stringifies one PostgreSQL cell across the column types the schema
/// uses.
fn postgres_cell(row: &PgRow, idx: usize) -> String {
    if let Ok(value) = row.try_get::<Option<i64>, _>(idx) {
        return value.map(|v| v.to_string()).unwrap_or_default();
    }
    if let Ok(value) = row.try_get::<Option<i32>, _>(idx) {
        return value.map(|v| v.to_string()).unwrap_or_default();
    }
    if let Ok(value) = row.try_get::<Option<f64>, _>(idx) {
        return value.map(|v| v.to_string()).unwrap_or_default();
    }
    if let Ok(value) = row.try_get::<Option<String>, _>(idx) {
        return value.unwrap_or_default();
    }
    if let Ok(value) = row.try_get::<Option<bool>, _>(idx) {
        return value.map(|v| v.to_string()).unwrap_or_default();
    }
    if let Ok(value) = row.try_get::<Option<DateTime<Utc>>, _>(idx) {
        return value.map(|v| v.to_rfc3339()).unwrap_or_default();
    }
    String::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_pool_with_options, PoolOptions};
    use std::time::Duration;

    /// Single-connection pool so the in-memory database is shared by every
    /// query in the test.
    async fn test_pool() -> DbPool {
        let options = PoolOptions {
            max_connections: 1,
            min_connections: 1,
            acquire_timeout: Duration::from_secs(5),
            max_lifetime: None,
            idle_timeout: None,
        };
        let pool = create_pool_with_options("sqlite::memory:", options)
            .await
            .unwrap();
        crate::db::run_migrations(&pool).await.unwrap();
        crate::db::seed_database(&pool).await.unwrap();
        pool
    }

    #[tokio::test]
    async fn test_execute_readonly_returns_columns_and_rows() {
        let pool = test_pool().await;

        let results = execute_readonly(
            &pool,
            "SELECT type_name, description FROM incident_types ORDER BY type_id",
        )
        .await
        .unwrap();

        assert_eq!(results.columns, vec!["type_name", "description"]);
        assert!(!results.rows.is_empty());
        assert_eq!(results.rows[0][0], "Ransomware");
    }

    #[tokio::test]
    async fn test_execute_readonly_rejects_writes() {
        let pool = test_pool().await;

        let result = execute_readonly(&pool, "DELETE FROM incidents").await;
        assert!(matches!(result, Err(NlqError::Rejected(_))));

        // The guard rejected before execution; the data is intact.
        let results = execute_readonly(&pool, "SELECT COUNT(*) AS n FROM incidents")
            .await
            .unwrap();
        assert_eq!(results.rows[0][0], "2");
    }

    #[tokio::test]
    async fn test_empty_result_sets_have_no_columns() {
        let pool = test_pool().await;

        let results = execute_readonly(
            &pool,
            "SELECT incident_title FROM incidents WHERE incident_id = -1",
        )
        .await
        .unwrap();

        assert!(results.columns.is_empty());
        assert!(results.rows.is_empty());
    }
}
