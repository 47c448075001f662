//! Security-team and threat-guideline repository.

use super::{DbError, DbPool};
use crate::incident::{Guideline, GuidelineSet, SecurityTeamMember};
use async_trait::async_trait;
use sqlx::FromRow;

/// Repository trait for the security team and its response guidelines.
#[async_trait]
pub trait TeamRepository: Send + Sync {
    /// Lists all team members with role names resolved.
    async fn list_members(&self) -> Result<Vec<SecurityTeamMember>, DbError>;

    /// The member that new incidents are assigned to, if the team is
    /// non-empty. Assignment policy is simply the lowest member id.
    async fn first_available(&self) -> Result<Option<SecurityTeamMember>, DbError>;

    /// DO/DONT guidelines for an incident type, grouped by category and
    /// ordered by risk level.
    async fn guidelines_for_type(&self, type_id: i64) -> Result<GuidelineSet, DbError>;
}

const MEMBERS_SQL: &str = r#"
    SELECT st.member_id, st.first_name, st.last_name, st.email, sr.role_name
    FROM security_team st
    JOIN security_roles sr ON st.role_id = sr.role_id
    ORDER BY st.member_id
"#;

const GUIDELINES_SQL_PREFIX: &str = r#"
    SELECT guideline_category, guideline_description, risk_level
    FROM threat_guidelines
"#;

const GUIDELINES_ORDER: &str = r#"
    ORDER BY
        CASE risk_level
            WHEN 'CRITICAL' THEN 0
            WHEN 'HIGH' THEN 1
            WHEN 'MEDIUM' THEN 2
            ELSE 3
        END,
        guideline_category
"#;

#[derive(FromRow)]
struct GuidelineRow {
    guideline_category: String,
    guideline_description: String,
    risk_level: String,
}

fn organize_guidelines(rows: Vec<GuidelineRow>) -> GuidelineSet {
    let mut set = GuidelineSet::default();
    for row in rows {
        let guideline = Guideline {
            description: row.guideline_description,
            risk_level: row.risk_level,
        };
        if row.guideline_category == "DONT" {
            set.dont_items.push(guideline);
        } else {
            set.do_items.push(guideline);
        }
    }
    set
}

/// SQLite implementation of `TeamRepository`.
pub struct SqliteTeamRepository {
    pool: sqlx::SqlitePool,
}

impl SqliteTeamRepository {
    pub fn new(pool: sqlx::SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TeamRepository for SqliteTeamRepository {
    async fn list_members(&self) -> Result<Vec<SecurityTeamMember>, DbError> {
        let members = sqlx::query_as::<_, SecurityTeamMember>(MEMBERS_SQL)
            .fetch_all(&self.pool)
            .await?;
        Ok(members)
    }

    async fn first_available(&self) -> Result<Option<SecurityTeamMember>, DbError> {
        let sql = format!("{} LIMIT 1", MEMBERS_SQL);
        let member = sqlx::query_as::<_, SecurityTeamMember>(&sql)
            .fetch_optional(&self.pool)
            .await?;
        Ok(member)
    }

    async fn guidelines_for_type(&self, type_id: i64) -> Result<GuidelineSet, DbError> {
        let sql = format!(
            "{} WHERE type_id = ? {}",
            GUIDELINES_SQL_PREFIX, GUIDELINES_ORDER
        );
        let rows = sqlx::query_as::<_, GuidelineRow>(&sql)
            .bind(type_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(organize_guidelines(rows))
    }
}

/// PostgreSQL implementation of `TeamRepository`.
pub struct PostgresTeamRepository {
    pool: sqlx::PgPool,
}

impl PostgresTeamRepository {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TeamRepository for PostgresTeamRepository {
    async fn list_members(&self) -> Result<Vec<SecurityTeamMember>, DbError> {
        let members = sqlx::query_as::<_, SecurityTeamMember>(MEMBERS_SQL)
            .fetch_all(&self.pool)
            .await?;
        Ok(members)
    }

    async fn first_available(&self) -> Result<Option<SecurityTeamMember>, DbError> {
        let sql = format!("{} LIMIT 1", MEMBERS_SQL);
        let member = sqlx::query_as::<_, SecurityTeamMember>(&sql)
            .fetch_optional(&self.pool)
            .await?;
        Ok(member)
    }

    async fn guidelines_for_type(&self, type_id: i64) -> Result<GuidelineSet, DbError> {
        let sql = format!(
            "{} WHERE type_id = $1 {}",
            GUIDELINES_SQL_PREFIX, GUIDELINES_ORDER
        );
        let rows = sqlx::query_as::<_, GuidelineRow>(&sql)
            .bind(type_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(organize_guidelines(rows))
    }
}

/// Creates a team repository for the pool's backend.
pub fn create_team_repository(pool: &DbPool) -> Box<dyn TeamRepository> {
    match pool {
        DbPool::Sqlite(p) => Box::new(SqliteTeamRepository::new(p.clone())),
        DbPool::Postgres(p) => Box::new(PostgresTeamRepository::new(p.clone())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_organize_guidelines_splits_by_category() {
        let rows = vec![
            GuidelineRow {
                guideline_category: "DO".to_string(),
                guideline_description: "Disconnect the machine from the network".to_string(),
                risk_level: "CRITICAL".to_string(),
            },
            GuidelineRow {
                guideline_category: "DONT".to_string(),
                guideline_description: "Do not pay the ransom".to_string(),
                risk_level: "HIGH".to_string(),
            },
            GuidelineRow {
                guideline_category: "DO".to_string(),
                guideline_description: "Preserve logs".to_string(),
                risk_level: "MEDIUM".to_string(),
            },
        ];

        let set = organize_guidelines(rows);
        assert_eq!(set.do_items.len(), 2);
        assert_eq!(set.dont_items.len(), 1);
        assert_eq!(set.dont_items[0].description, "Do not pay the ransom");
    }
}
