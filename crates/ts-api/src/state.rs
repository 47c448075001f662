//! Application state shared across handlers.

use std::sync::Arc;
use ts_core::db::DbPool;
use ts_core::{QueryTranslator, SessionKeys};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: Arc<DbPool>,
    /// Natural-language query translator.
    pub translator: Arc<dyn QueryTranslator>,
    /// Keys for signing and verifying session tokens.
    pub session_keys: Arc<SessionKeys>,
}

impl AppState {
    /// Creates application state.
    pub fn new(
        db: DbPool,
        translator: Arc<dyn QueryTranslator>,
        session_keys: SessionKeys,
    ) -> Self {
        Self {
            db: Arc::new(db),
            translator,
            session_keys: Arc::new(session_keys),
        }
    }
}
