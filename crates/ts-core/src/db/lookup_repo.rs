//! Repository for the static lookup tables.
//!
//! All lookup tables share the `(id, name [, description])` shape, so one
//! repository serves them all, parameterized by [`LookupKind`]. Table and
//! column names come from the enum, never from caller input.

use super::{DbError, DbPool};
use crate::incident::LookupEntry;
use async_trait::async_trait;

/// Identifies a lookup table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupKind {
    IncidentType,
    SeverityLevel,
    IncidentStatus,
    CriticalityLevel,
    SystemType,
    AffectedSystem,
    Department,
    SecurityRole,
}

impl LookupKind {
    /// Entity name used in error messages.
    pub fn entity(&self) -> &'static str {
        match self {
            LookupKind::IncidentType => "incident type",
            LookupKind::SeverityLevel => "severity level",
            LookupKind::IncidentStatus => "incident status",
            LookupKind::CriticalityLevel => "criticality level",
            LookupKind::SystemType => "system type",
            LookupKind::AffectedSystem => "affected system",
            LookupKind::Department => "department",
            LookupKind::SecurityRole => "security role",
        }
    }

    fn table(&self) -> &'static str {
        match self {
            LookupKind::IncidentType => "incident_types",
            LookupKind::SeverityLevel => "severity_levels",
            LookupKind::IncidentStatus => "incident_statuses",
            LookupKind::CriticalityLevel => "criticality_levels",
            LookupKind::SystemType => "system_types",
            LookupKind::AffectedSystem => "affected_systems",
            LookupKind::Department => "departments",
            LookupKind::SecurityRole => "security_roles",
        }
    }

    fn id_column(&self) -> &'static str {
        match self {
            LookupKind::IncidentType => "type_id",
            LookupKind::SeverityLevel => "severity_id",
            LookupKind::IncidentStatus => "status_id",
            LookupKind::CriticalityLevel => "criticality_id",
            LookupKind::SystemType => "system_type_id",
            LookupKind::AffectedSystem => "system_id",
            LookupKind::Department => "department_id",
            LookupKind::SecurityRole => "role_id",
        }
    }

    fn name_column(&self) -> &'static str {
        match self {
            LookupKind::IncidentType => "type_name",
            LookupKind::SeverityLevel => "severity_name",
            LookupKind::IncidentStatus => "status_name",
            LookupKind::CriticalityLevel => "level_name",
            LookupKind::SystemType => "type_name",
            LookupKind::AffectedSystem => "system_name",
            LookupKind::Department => "department_name",
            LookupKind::SecurityRole => "role_name",
        }
    }

    fn has_description(&self) -> bool {
        matches!(
            self,
            LookupKind::IncidentType
                | LookupKind::SeverityLevel
                | LookupKind::IncidentStatus
                | LookupKind::CriticalityLevel
                | LookupKind::SystemType
        )
    }

    fn list_sql(&self) -> String {
        let description = if self.has_description() {
            "description"
        } else {
            "NULL AS description"
        };
        format!(
            "SELECT {id} AS id, {name} AS name, {description} FROM {table} ORDER BY {id}",
            id = self.id_column(),
            name = self.name_column(),
            description = description,
            table = self.table(),
        )
    }

    fn id_by_name_sql(&self, placeholder: &str) -> String {
        format!(
            "SELECT {id} FROM {table} WHERE {name} = {placeholder}",
            id = self.id_column(),
            table = self.table(),
            name = self.name_column(),
            placeholder = placeholder,
        )
    }
}

/// Repository trait for lookup tables.
#[async_trait]
pub trait LookupRepository: Send + Sync {
    /// Lists all rows of a lookup table in id order.
    async fn list(&self, kind: LookupKind) -> Result<Vec<LookupEntry>, DbError>;

    /// Resolves a name to its id.
    ///
    /// A name absent from the table is `DbError::NotFound`, never a silent
    /// NULL foreign key.
    async fn id_by_name(&self, kind: LookupKind, name: &str) -> Result<i64, DbError>;
}

/// SQLite implementation of `LookupRepository`.
pub struct SqliteLookupRepository {
    pool: sqlx::SqlitePool,
}

impl SqliteLookupRepository {
    pub fn new(pool: sqlx::SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LookupRepository for SqliteLookupRepository {
    async fn list(&self, kind: LookupKind) -> Result<Vec<LookupEntry>, DbError> {
        let rows = sqlx::query_as::<_, LookupEntry>(&kind.list_sql())
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn id_by_name(&self, kind: LookupKind, name: &str) -> Result<i64, DbError> {
        let id: Option<i64> = sqlx::query_scalar(&kind.id_by_name_sql("?"))
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;

        id.ok_or_else(|| DbError::not_found(kind.entity(), name))
    }
}

/// PostgreSQL implementation of `LookupRepository`.
pub struct PostgresLookupRepository {
    pool: sqlx::PgPool,
}

impl PostgresLookupRepository {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LookupRepository for PostgresLookupRepository {
    async fn list(&self, kind: LookupKind) -> Result<Vec<LookupEntry>, DbError> {
        let rows = sqlx::query_as::<_, LookupEntry>(&kind.list_sql())
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn id_by_name(&self, kind: LookupKind, name: &str) -> Result<i64, DbError> {
        let id: Option<i64> = sqlx::query_scalar(&kind.id_by_name_sql("$1"))
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;

        id.ok_or_else(|| DbError::not_found(kind.entity(), name))
    }
}

/// Creates a lookup repository for the pool's backend.
pub fn create_lookup_repository(pool: &DbPool) -> Box<dyn LookupRepository> {
    match pool {
        DbPool::Sqlite(p) => Box::new(SqliteLookupRepository::new(p.clone())),
        DbPool::Postgres(p) => Box::new(PostgresLookupRepository::new(p.clone())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_sql_includes_description_when_present() {
        let sql = LookupKind::IncidentType.list_sql();
        assert_eq!(
            sql,
            "SELECT type_id AS id, type_name AS name, description FROM incident_types ORDER BY type_id"
        );
    }

    #[test]
    fn test_list_sql_null_description_for_departments() {
        let sql = LookupKind::Department.list_sql();
        assert!(sql.contains("NULL AS description"));
        assert!(sql.contains("FROM departments"));
    }

    #[test]
    fn test_id_by_name_sql_placeholders() {
        assert_eq!(
            LookupKind::SeverityLevel.id_by_name_sql("?"),
            "SELECT severity_id FROM severity_levels WHERE severity_name = ?"
        );
        assert_eq!(
            LookupKind::AffectedSystem.id_by_name_sql("$1"),
            "SELECT system_id FROM affected_systems WHERE system_name = $1"
        );
    }
}
