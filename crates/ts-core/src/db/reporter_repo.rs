//! Reporter account repository.
//!
//! Password verification itself (comparing a candidate against the stored
//! Argon2 hash) happens in the caller; this repository only reads and
//! writes the stored hash.

use super::{DbError, DbPool};
use crate::incident::{NewReporter, Reporter};
use async_trait::async_trait;

/// Repository trait for reporter accounts.
#[async_trait]
pub trait ReporterRepository: Send + Sync {
    /// Fetches a reporter by email.
    async fn get_by_email(&self, email: &str) -> Result<Option<Reporter>, DbError>;

    /// Creates a reporter account, returning the new id.
    async fn create(&self, reporter: &NewReporter) -> Result<i64, DbError>;

    /// Replaces the stored password hash for the given email.
    /// `DbError::NotFound` if no reporter has that email.
    async fn update_password(&self, email: &str, password_hash: &str) -> Result<(), DbError>;

    /// Replaces the stored contact number for the given email.
    /// `DbError::NotFound` if no reporter has that email.
    async fn update_contact_number(&self, email: &str, contact_number: &str)
        -> Result<(), DbError>;

    /// Whether any reporter accounts exist.
    async fn any_exist(&self) -> Result<bool, DbError>;
}

const GET_BY_EMAIL_COLUMNS: &str = "reporter_id, first_name, last_name, email, password_hash, \
                                    contact_number, department_id";

/// SQLite implementation of `ReporterRepository`.
pub struct SqliteReporterRepository {
    pool: sqlx::SqlitePool,
}

impl SqliteReporterRepository {
    pub fn new(pool: sqlx::SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReporterRepository for SqliteReporterRepository {
    async fn get_by_email(&self, email: &str) -> Result<Option<Reporter>, DbError> {
        let sql = format!(
            "SELECT {} FROM reporters WHERE email = ?",
            GET_BY_EMAIL_COLUMNS
        );
        let reporter = sqlx::query_as::<_, Reporter>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(reporter)
    }

    async fn create(&self, reporter: &NewReporter) -> Result<i64, DbError> {
        let result = sqlx::query(
            "INSERT INTO reporters
                (first_name, last_name, email, password_hash, contact_number, department_id)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&reporter.first_name)
        .bind(&reporter.last_name)
        .bind(&reporter.email)
        .bind(&reporter.password_hash)
        .bind(&reporter.contact_number)
        .bind(reporter.department_id)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    async fn update_password(&self, email: &str, password_hash: &str) -> Result<(), DbError> {
        let result = sqlx::query("UPDATE reporters SET password_hash = ? WHERE email = ?")
            .bind(password_hash)
            .bind(email)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("reporter", email));
        }
        Ok(())
    }

    async fn update_contact_number(
        &self,
        email: &str,
        contact_number: &str,
    ) -> Result<(), DbError> {
        let result = sqlx::query("UPDATE reporters SET contact_number = ? WHERE email = ?")
            .bind(contact_number)
            .bind(email)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("reporter", email));
        }
        Ok(())
    }

    async fn any_exist(&self) -> Result<bool, DbError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM reporters")
            .fetch_one(&self.pool)
            .await?;
        Ok(count > 0)
    }
}

/// PostgreSQL implementation of `ReporterRepository`.
pub struct PostgresReporterRepository {
    pool: sqlx::PgPool,
}

impl PostgresReporterRepository {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReporterRepository for PostgresReporterRepository {
    async fn get_by_email(&self, email: &str) -> Result<Option<Reporter>, DbError> {
        let sql = format!(
            "SELECT {} FROM reporters WHERE email = $1",
            GET_BY_EMAIL_COLUMNS
        );
        let reporter = sqlx::query_as::<_, Reporter>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(reporter)
    }

    async fn create(&self, reporter: &NewReporter) -> Result<i64, DbError> {
        let reporter_id: i64 = sqlx::query_scalar(
            "INSERT INTO reporters
                (first_name, last_name, email, password_hash, contact_number, department_id)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING reporter_id",
        )
        .bind(&reporter.first_name)
        .bind(&reporter.last_name)
        .bind(&reporter.email)
        .bind(&reporter.password_hash)
        .bind(&reporter.contact_number)
        .bind(reporter.department_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(reporter_id)
    }

    async fn update_password(&self, email: &str, password_hash: &str) -> Result<(), DbError> {
        let result = sqlx::query("UPDATE reporters SET password_hash = $1 WHERE email = $2")
            .bind(password_hash)
            .bind(email)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("reporter", email));
        }
        Ok(())
    }

    async fn update_contact_number(
        &self,
        email: &str,
        contact_number: &str,
    ) -> Result<(), DbError> {
        let result = sqlx::query("UPDATE reporters SET contact_number = $1 WHERE email = $2")
            .bind(contact_number)
            .bind(email)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("reporter", email));
        }
        Ok(())
    }

    async fn any_exist(&self) -> Result<bool, DbError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM reporters")
            .fetch_one(&self.pool)
            .await?;
        Ok(count > 0)
    }
}

/// Creates a reporter repository for the pool's backend.
pub fn create_reporter_repository(pool: &DbPool) -> Box<dyn ReporterRepository> {
    match pool {
        DbPool::Sqlite(p) => Box::new(SqliteReporterRepository::new(p.clone())),
        DbPool::Postgres(p) => Box::new(PostgresReporterRepository::new(p.clone())),
    }
}
