//! Dashboard analytics queries.
//!
//! Aggregates are computed with plain GROUP BY queries; the monthly trend
//! is bucketed in Rust over a fixed trailing six-month window so that
//! months with no incidents still appear with a zero count, identically on
//! both backends.

use super::{DbError, DbPool};
use crate::incident::{MonthlyCount, SeverityCount, TypeCount};
use async_trait::async_trait;
use chrono::{DateTime, Datelike, TimeZone, Utc};

/// Number of months in the dashboard trend window.
pub const TREND_MONTHS: usize = 6;

/// Repository trait for dashboard aggregates.
#[async_trait]
pub trait AnalyticsRepository: Send + Sync {
    /// Total number of incidents.
    async fn total_incidents(&self) -> Result<u64, DbError>;

    /// Incidents with severity "Critical".
    async fn critical_incidents(&self) -> Result<u64, DbError>;

    /// Incidents whose status is not Resolved or Closed.
    async fn active_incidents(&self) -> Result<u64, DbError>;

    /// The most frequent incident type, if any incidents exist.
    async fn most_common_type(&self) -> Result<Option<TypeCount>, DbError>;

    /// Distinct departments that have reported incidents.
    async fn active_departments(&self) -> Result<u64, DbError>;

    /// Total departments on record.
    async fn total_departments(&self) -> Result<u64, DbError>;

    /// One row per severity present in the incidents table; counts sum to
    /// the total incident count.
    async fn severity_distribution(&self) -> Result<Vec<SeverityCount>, DbError>;

    /// Top incident types by count.
    async fn type_distribution(&self, limit: i64) -> Result<Vec<TypeCount>, DbError>;

    /// Incident counts for the trailing six calendar months, oldest first,
    /// zero-filled.
    async fn monthly_incidents(&self) -> Result<Vec<MonthlyCount>, DbError>;
}

const TOTAL_SQL: &str = "SELECT COUNT(*) FROM incidents";

const CRITICAL_SQL: &str = r#"
    SELECT COUNT(*)
    FROM incidents i
    JOIN severity_levels sl ON i.severity_id = sl.severity_id
    WHERE sl.severity_name = 'Critical'
"#;

const ACTIVE_SQL: &str = r#"
    SELECT COUNT(*)
    FROM incidents i
    JOIN incident_statuses st ON i.status_id = st.status_id
    WHERE st.status_name NOT IN ('Resolved', 'Closed')
"#;

const ACTIVE_DEPARTMENTS_SQL: &str = r#"
    SELECT COUNT(DISTINCT r.department_id)
    FROM incidents i
    JOIN reporters r ON i.reporter_id = r.reporter_id
"#;

const TOTAL_DEPARTMENTS_SQL: &str = "SELECT COUNT(*) FROM departments";

const SEVERITY_DISTRIBUTION_SQL: &str = r#"
    SELECT sl.severity_name AS name, COUNT(*) AS count
    FROM incidents i
    JOIN severity_levels sl ON i.severity_id = sl.severity_id
    GROUP BY sl.severity_id, sl.severity_name
    ORDER BY sl.severity_id
"#;

const TYPE_DISTRIBUTION_SQL_PREFIX: &str = r#"
    SELECT it.type_name AS name, COUNT(*) AS count
    FROM incidents i
    JOIN incident_types it ON i.type_id = it.type_id
    GROUP BY it.type_id, it.type_name
    ORDER BY count DESC
"#;

/// Returns the six (year, month) pairs ending at `now`'s month, oldest
/// first.
fn month_window(now: DateTime<Utc>) -> Vec<(i32, u32)> {
    let mut year = now.year();
    let mut month = now.month() as i32 - (TREND_MONTHS as i32 - 1);
    while month <= 0 {
        month += 12;
        year -= 1;
    }

    let mut window = Vec::with_capacity(TREND_MONTHS);
    for _ in 0..TREND_MONTHS {
        window.push((year, month as u32));
        month += 1;
        if month > 12 {
            month = 1;
            year += 1;
        }
    }
    window
}

fn month_label(month: u32) -> &'static str {
    match month {
        1 => "Jan",
        2 => "Feb",
        3 => "Mar",
        4 => "Apr",
        5 => "May",
        6 => "Jun",
        7 => "Jul",
        8 => "Aug",
        9 => "Sep",
        10 => "Oct",
        11 => "Nov",
        _ => "Dec",
    }
}

/// Start of the oldest month in the trend window.
fn window_start(now: DateTime<Utc>) -> DateTime<Utc> {
    let (year, month) = month_window(now)[0];
    Utc.with_ymd_and_hms(year, month, 1, 0, 0, 0)
        .single()
        .expect("first day of month is a valid timestamp")
}

/// Buckets discovery timestamps into the six-month window, zero-filling
/// months with no incidents.
fn bucket_monthly(dates: &[DateTime<Utc>], now: DateTime<Utc>) -> Vec<MonthlyCount> {
    let window = month_window(now);

    window
        .iter()
        .map(|&(year, month)| {
            let incidents = dates
                .iter()
                .filter(|d| d.year() == year && d.month() == month)
                .count() as i64;
            MonthlyCount {
                month: month_label(month).to_string(),
                incidents,
            }
        })
        .collect()
}

/// SQLite implementation of `AnalyticsRepository`.
pub struct SqliteAnalyticsRepository {
    pool: sqlx::SqlitePool,
}

impl SqliteAnalyticsRepository {
    pub fn new(pool: sqlx::SqlitePool) -> Self {
        Self { pool }
    }

    async fn scalar(&self, sql: &str) -> Result<u64, DbError> {
        let count: i64 = sqlx::query_scalar(sql).fetch_one(&self.pool).await?;
        Ok(count as u64)
    }
}

#[async_trait]
impl AnalyticsRepository for SqliteAnalyticsRepository {
    async fn total_incidents(&self) -> Result<u64, DbError> {
        self.scalar(TOTAL_SQL).await
    }

    async fn critical_incidents(&self) -> Result<u64, DbError> {
        self.scalar(CRITICAL_SQL).await
    }

    async fn active_incidents(&self) -> Result<u64, DbError> {
        self.scalar(ACTIVE_SQL).await
    }

    async fn most_common_type(&self) -> Result<Option<TypeCount>, DbError> {
        let sql = format!("{} LIMIT 1", TYPE_DISTRIBUTION_SQL_PREFIX);
        let row = sqlx::query_as::<_, TypeCount>(&sql)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn active_departments(&self) -> Result<u64, DbError> {
        self.scalar(ACTIVE_DEPARTMENTS_SQL).await
    }

    async fn total_departments(&self) -> Result<u64, DbError> {
        self.scalar(TOTAL_DEPARTMENTS_SQL).await
    }

    async fn severity_distribution(&self) -> Result<Vec<SeverityCount>, DbError> {
        let rows = sqlx::query_as::<_, SeverityCount>(SEVERITY_DISTRIBUTION_SQL)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn type_distribution(&self, limit: i64) -> Result<Vec<TypeCount>, DbError> {
        let sql = format!("{} LIMIT ?", TYPE_DISTRIBUTION_SQL_PREFIX);
        let rows = sqlx::query_as::<_, TypeCount>(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn monthly_incidents(&self) -> Result<Vec<MonthlyCount>, DbError> {
        let now = Utc::now();
        let dates: Vec<DateTime<Utc>> = sqlx::query_scalar(
            "SELECT discovered_at FROM incidents WHERE discovered_at >= ?",
        )
        .bind(window_start(now))
        .fetch_all(&self.pool)
        .await?;

        Ok(bucket_monthly(&dates, now))
    }
}

/// PostgreSQL implementation of `AnalyticsRepository`.
pub struct PostgresAnalyticsRepository {
    pool: sqlx::PgPool,
}

impl PostgresAnalyticsRepository {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }

    async fn scalar(&self, sql: &str) -> Result<u64, DbError> {
        let count: i64 = sqlx::query_scalar(sql).fetch_one(&self.pool).await?;
        Ok(count as u64)
    }
}

#[async_trait]
impl AnalyticsRepository for PostgresAnalyticsRepository {
    async fn total_incidents(&self) -> Result<u64, DbError> {
        self.scalar(TOTAL_SQL).await
    }

    async fn critical_incidents(&self) -> Result<u64, DbError> {
        self.scalar(CRITICAL_SQL).await
    }

    async fn active_incidents(&self) -> Result<u64, DbError> {
        self.scalar(ACTIVE_SQL).await
    }

    async fn most_common_type(&self) -> Result<Option<TypeCount>, DbError> {
        let sql = format!("{} LIMIT 1", TYPE_DISTRIBUTION_SQL_PREFIX);
        let row = sqlx::query_as::<_, TypeCount>(&sql)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn active_departments(&self) -> Result<u64, DbError> {
        self.scalar(ACTIVE_DEPARTMENTS_SQL).await
    }

    async fn total_departments(&self) -> Result<u64, DbError> {
        self.scalar(TOTAL_DEPARTMENTS_SQL).await
    }

    async fn severity_distribution(&self) -> Result<Vec<SeverityCount>, DbError> {
        let rows = sqlx::query_as::<_, SeverityCount>(SEVERITY_DISTRIBUTION_SQL)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn type_distribution(&self, limit: i64) -> Result<Vec<TypeCount>, DbError> {
        let sql = format!("{} LIMIT $1", TYPE_DISTRIBUTION_SQL_PREFIX);
        let rows = sqlx::query_as::<_, TypeCount>(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn monthly_incidents(&self) -> Result<Vec<MonthlyCount>, DbError> {
        let now = Utc::now();
        let dates: Vec<DateTime<Utc>> = sqlx::query_scalar(
            "SELECT discovered_at FROM incidents WHERE discovered_at >= $1",
        )
        .bind(window_start(now))
        .fetch_all(&self.pool)
        .await?;

        Ok(bucket_monthly(&dates, now))
    }
}

/// Creates an analytics repository for the pool's backend.
pub fn create_analytics_repository(pool: &DbPool) -> Box<dyn AnalyticsRepository> {
    match pool {
        DbPool::Sqlite(p) => Box::new(SqliteAnalyticsRepository::new(p.clone())),
        DbPool::Postgres(p) => Box::new(PostgresAnalyticsRepository::new(p.clone())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(year: i32, month: u32, day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, month, day, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_month_window_within_year() {
        let window = month_window(at(2024, 8, 15));
        assert_eq!(
            window,
            vec![(2024, 3), (2024, 4), (2024, 5), (2024, 6), (2024, 7), (2024, 8)]
        );
    }

    #[test]
    fn test_month_window_across_year_boundary() {
        let window = month_window(at(2024, 2, 1));
        assert_eq!(
            window,
            vec![(2023, 9), (2023, 10), (2023, 11), (2023, 12), (2024, 1), (2024, 2)]
        );
    }

    #[test]
    fn test_bucket_monthly_is_zero_filled() {
        let buckets = bucket_monthly(&[], at(2024, 8, 15));
        assert_eq!(buckets.len(), TREND_MONTHS);
        assert!(buckets.iter().all(|b| b.incidents == 0));
        assert_eq!(buckets[0].month, "Mar");
        assert_eq!(buckets[5].month, "Aug");
    }

    #[test]
    fn test_bucket_monthly_counts_by_month() {
        let dates = vec![
            at(2024, 8, 1),
            at(2024, 8, 20),
            at(2024, 6, 3),
            // Outside the window, same month a year earlier.
            at(2023, 8, 5),
        ];

        let buckets = bucket_monthly(&dates, at(2024, 8, 15));
        assert_eq!(buckets[5], MonthlyCount { month: "Aug".to_string(), incidents: 2 });
        assert_eq!(buckets[3], MonthlyCount { month: "Jun".to_string(), incidents: 1 });
        assert_eq!(buckets[0].incidents, 0);
    }

    #[test]
    fn test_window_start_is_first_of_oldest_month() {
        let start = window_start(at(2024, 8, 15));
        assert_eq!(start, Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap());
    }
}
