//! Incident repository.
//!
//! Incident creation is a single transaction covering the incident row,
//! the security-team assignment, and the activity-log entries; a failure
//! at any step rolls the whole submission back. Listing queries resolve
//! lookup names via LEFT JOINs, defaulting to "Unknown" when a referenced
//! row is missing rather than dropping the incident.

use super::{DbError, DbPool};
use crate::incident::{IncidentDetail, IncidentSummary, NewIncident, RecentIncident};
use async_trait::async_trait;
use chrono::Utc;

/// Repository trait for incident persistence.
#[async_trait]
pub trait IncidentRepository: Send + Sync {
    /// Creates an incident atomically, including the initial assignment
    /// (when `assigned_to` is set) and activity-log rows. Returns the new
    /// incident id.
    async fn create(&self, incident: &NewIncident) -> Result<i64, DbError>;

    /// Lists all incidents, most recently discovered first.
    async fn list(&self) -> Result<Vec<IncidentSummary>, DbError>;

    /// Returns the `limit` most recently reported incidents.
    async fn recent(&self, limit: i64) -> Result<Vec<RecentIncident>, DbError>;

    /// Fetches full detail for one incident.
    async fn get_detail(&self, incident_id: i64) -> Result<Option<IncidentDetail>, DbError>;

    /// Assigns a security-team member and moves the incident to the given
    /// status. `DbError::NotFound` if the incident does not exist.
    async fn assign(
        &self,
        incident_id: i64,
        member_id: i64,
        status_id: i64,
    ) -> Result<(), DbError>;

    /// Counts all incidents.
    async fn count(&self) -> Result<u64, DbError>;
}

const LIST_SQL: &str = r#"
    SELECT
        i.incident_id,
        i.incident_title,
        COALESCE(it.type_name, 'Unknown') AS incident_type,
        COALESCE(sl.severity_name, 'Unknown') AS severity,
        COALESCE(a.system_name, 'Unknown') AS affected_system,
        COALESCE(d.department_name, 'Unknown') AS department,
        COALESCE(st.status_name, 'Unknown') AS status,
        i.discovered_at,
        i.description,
        i.financial_impact
    FROM incidents i
    LEFT JOIN incident_types it ON i.type_id = it.type_id
    LEFT JOIN severity_levels sl ON i.severity_id = sl.severity_id
    LEFT JOIN affected_systems a ON i.system_id = a.system_id
    LEFT JOIN reporters r ON i.reporter_id = r.reporter_id
    LEFT JOIN departments d ON r.department_id = d.department_id
    LEFT JOIN incident_statuses st ON i.status_id = st.status_id
    ORDER BY i.discovered_at DESC
"#;

const DETAIL_SQL_PREFIX: &str = r#"
    SELECT
        i.incident_id,
        i.incident_title,
        COALESCE(it.type_name, 'Unknown') AS incident_type,
        COALESCE(sl.severity_name, 'Unknown') AS severity,
        COALESCE(a.system_name, 'Unknown') AS affected_system,
        COALESCE(d.department_name, 'Unknown') AS department,
        COALESCE(st.status_name, 'Unknown') AS status,
        COALESCE(r.first_name || ' ' || r.last_name, 'Unknown') AS reporter_name,
        m.first_name || ' ' || m.last_name AS assigned_to,
        i.discovered_at,
        i.reported_at,
        i.description,
        i.financial_impact
    FROM incidents i
    LEFT JOIN incident_types it ON i.type_id = it.type_id
    LEFT JOIN severity_levels sl ON i.severity_id = sl.severity_id
    LEFT JOIN affected_systems a ON i.system_id = a.system_id
    LEFT JOIN reporters r ON i.reporter_id = r.reporter_id
    LEFT JOIN departments d ON r.department_id = d.department_id
    LEFT JOIN incident_statuses st ON i.status_id = st.status_id
    LEFT JOIN security_team m ON i.assigned_to = m.member_id
"#;

const RECENT_SQL_PREFIX: &str = r#"
    SELECT
        i.incident_id,
        i.incident_title,
        COALESCE(it.type_name, 'Unknown') AS incident_type,
        COALESCE(sl.severity_name, 'Unknown') AS severity,
        i.discovered_at
    FROM incidents i
    LEFT JOIN incident_types it ON i.type_id = it.type_id
    LEFT JOIN severity_levels sl ON i.severity_id = sl.severity_id
    ORDER BY i.created_at DESC
"#;

/// SQLite implementation of `IncidentRepository`.
pub struct SqliteIncidentRepository {
    pool: sqlx::SqlitePool,
}

impl SqliteIncidentRepository {
    pub fn new(pool: sqlx::SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl IncidentRepository for SqliteIncidentRepository {
    async fn create(&self, incident: &NewIncident) -> Result<i64, DbError> {
        let now = Utc::now();
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::Transaction(e.to_string()))?;

        let result = sqlx::query(
            r#"
            INSERT INTO incidents
                (incident_title, type_id, severity_id, system_id, reporter_id, status_id,
                 assigned_to, discovered_at, reported_at, description, financial_impact,
                 created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&incident.title)
        .bind(incident.type_id)
        .bind(incident.severity_id)
        .bind(incident.system_id)
        .bind(incident.reporter_id)
        .bind(incident.status_id)
        .bind(incident.assigned_to)
        .bind(incident.discovered_at)
        .bind(incident.reported_at)
        .bind(&incident.description)
        .bind(incident.financial_impact)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        let incident_id = result.last_insert_rowid();

        sqlx::query(
            "INSERT INTO incident_logs (incident_id, logged_by, log_time, activity, details)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(incident_id)
        .bind(incident.assigned_to)
        .bind(now)
        .bind("Incident reported")
        .bind(None::<String>)
        .execute(&mut *tx)
        .await?;

        if let Some(response) = &incident.initial_response {
            sqlx::query(
                "INSERT INTO incident_logs (incident_id, logged_by, log_time, activity, details)
                 VALUES (?, ?, ?, ?, ?)",
            )
            .bind(incident_id)
            .bind(incident.assigned_to)
            .bind(now)
            .bind("Initial response recorded")
            .bind(response)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit()
            .await
            .map_err(|e| DbError::Transaction(e.to_string()))?;

        Ok(incident_id)
    }

    async fn list(&self) -> Result<Vec<IncidentSummary>, DbError> {
        let rows = sqlx::query_as::<_, IncidentSummary>(LIST_SQL)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn recent(&self, limit: i64) -> Result<Vec<RecentIncident>, DbError> {
        let sql = format!("{} LIMIT ?", RECENT_SQL_PREFIX);
        let rows = sqlx::query_as::<_, RecentIncident>(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn get_detail(&self, incident_id: i64) -> Result<Option<IncidentDetail>, DbError> {
        let sql = format!("{} WHERE i.incident_id = ?", DETAIL_SQL_PREFIX);
        let row = sqlx::query_as::<_, IncidentDetail>(&sql)
            .bind(incident_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn assign(
        &self,
        incident_id: i64,
        member_id: i64,
        status_id: i64,
    ) -> Result<(), DbError> {
        let now = Utc::now();
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::Transaction(e.to_string()))?;

        let result = sqlx::query(
            "UPDATE incidents SET assigned_to = ?, status_id = ?, updated_at = ?
             WHERE incident_id = ?",
        )
        .bind(member_id)
        .bind(status_id)
        .bind(now)
        .bind(incident_id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("incident", incident_id));
        }

        sqlx::query(
            "INSERT INTO incident_logs (incident_id, logged_by, log_time, activity, details)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(incident_id)
        .bind(member_id)
        .bind(now)
        .bind("Assigned to security team")
        .bind(None::<String>)
        .execute(&mut *tx)
        .await?;

        tx.commit()
            .await
            .map_err(|e| DbError::Transaction(e.to_string()))?;

        Ok(())
    }

    async fn count(&self) -> Result<u64, DbError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM incidents")
            .fetch_one(&self.pool)
            .await?;
        Ok(count as u64)
    }
}

/// PostgreSQL implementation of `IncidentRepository`.
pub struct PostgresIncidentRepository {
    pool: sqlx::PgPool,
}

impl PostgresIncidentRepository {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl IncidentRepository for PostgresIncidentRepository {
    async fn create(&self, incident: &NewIncident) -> Result<i64, DbError> {
        let now = Utc::now();
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::Transaction(e.to_string()))?;

        let incident_id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO incidents
                (incident_title, type_id, severity_id, system_id, reporter_id, status_id,
                 assigned_to, discovered_at, reported_at, description, financial_impact,
                 created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING incident_id
            "#,
        )
        .bind(&incident.title)
        .bind(incident.type_id)
        .bind(incident.severity_id)
        .bind(incident.system_id)
        .bind(incident.reporter_id)
        .bind(incident.status_id)
        .bind(incident.assigned_to)
        .bind(incident.discovered_at)
        .bind(incident.reported_at)
        .bind(&incident.description)
        .bind(incident.financial_impact)
        .bind(now)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            "INSERT INTO incident_logs (incident_id, logged_by, log_time, activity, details)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(incident_id)
        .bind(incident.assigned_to)
        .bind(now)
        .bind("Incident reported")
        .bind(None::<String>)
        .execute(&mut *tx)
        .await?;

        if let Some(response) = &incident.initial_response {
            sqlx::query(
                "INSERT INTO incident_logs (incident_id, logged_by, log_time, activity, details)
                 VALUES ($1, $2, $3, $4, $5)",
            )
            .bind(incident_id)
            .bind(incident.assigned_to)
            .bind(now)
            .bind("Initial response recorded")
            .bind(response)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit()
            .await
            .map_err(|e| DbError::Transaction(e.to_string()))?;

        Ok(incident_id)
    }

    async fn list(&self) -> Result<Vec<IncidentSummary>, DbError> {
        let rows = sqlx::query_as::<_, IncidentSummary>(LIST_SQL)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn recent(&self, limit: i64) -> Result<Vec<RecentIncident>, DbError> {
        let sql = format!("{} LIMIT $1", RECENT_SQL_PREFIX);
        let rows = sqlx::query_as::<_, RecentIncident>(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn get_detail(&self, incident_id: i64) -> Result<Option<IncidentDetail>, DbError> {
        let sql = format!("{} WHERE i.incident_id = $1", DETAIL_SQL_PREFIX);
        let row = sqlx::query_as::<_, IncidentDetail>(&sql)
            .bind(incident_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn assign(
        &self,
        incident_id: i64,
        member_id: i64,
        status_id: i64,
    ) -> Result<(), DbError> {
        let now = Utc::now();
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::Transaction(e.to_string()))?;

        let result = sqlx::query(
            "UPDATE incidents SET assigned_to = $1, status_id = $2, updated_at = $3
             WHERE incident_id = $4",
        )
        .bind(member_id)
        .bind(status_id)
        .bind(now)
        .bind(incident_id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("incident", incident_id));
        }

        sqlx::query(
            "INSERT INTO incident_logs (incident_id, logged_by, log_time, activity, details)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(incident_id)
        .bind(member_id)
        .bind(now)
        .bind("Assigned to security team")
        .bind(None::<String>)
        .execute(&mut *tx)
        .await?;

        tx.commit()
            .await
            .map_err(|e| DbError::Transaction(e.to_string()))?;

        Ok(())
    }

    async fn count(&self) -> Result<u64, DbError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM incidents")
            .fetch_one(&self.pool)
            .await?;
        Ok(count as u64)
    }
}

/// Creates an incident repository for the pool's backend.
pub fn create_incident_repository(pool: &DbPool) -> Box<dyn IncidentRepository> {
    match pool {
        DbPool::Sqlite(p) => Box::new(SqliteIncidentRepository::new(p.clone())),
        DbPool::Postgres(p) => Box::new(PostgresIncidentRepository::new(p.clone())),
    }
}
