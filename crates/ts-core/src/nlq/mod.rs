//! Natural-language to SQL translation.
//!
//! The translator forwards a free-text question, together with a fixed
//! schema-describing prompt, to a hosted text-generation model and returns
//! the SQL it produces. Generated SQL is never trusted: before execution
//! it must pass the guard, which admits only a single SELECT statement
//! over the schema's tables.

mod exec;
mod guard;
mod translator;

use thiserror::Error;

pub use exec::{execute_readonly, QueryResults};
pub use guard::{ensure_read_only, ALLOWED_TABLES};
pub use translator::{render_insert_template, InsertTemplate, LlmConfig, LlmTranslator};

use crate::db::DbError;
use async_trait::async_trait;

/// Errors from the NL-to-SQL pipeline.
#[derive(Error, Debug)]
pub enum NlqError {
    /// The translation service could not be reached.
    #[error("Translation service error: {0}")]
    Service(String),

    /// The translation service answered with a non-success status.
    #[error("Translation service returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The model produced no usable SQL.
    #[error("Translation produced an empty response")]
    EmptyResponse,

    /// The generated SQL was rejected by the guard.
    #[error("Generated SQL rejected: {0}")]
    Rejected(String),

    /// Executing the guarded query failed.
    #[error(transparent)]
    Db(#[from] DbError),
}

/// Translates natural-language questions into SQL.
///
/// The production implementation is [`LlmTranslator`]; tests substitute a
/// canned translator.
#[async_trait]
pub trait QueryTranslator: Send + Sync {
    /// Translates a question into a single SQL statement.
    async fn translate(&self, question: &str) -> Result<String, NlqError>;
}
