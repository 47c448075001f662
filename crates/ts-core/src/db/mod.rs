//! Database layer for Threat Sentinel.
//!
//! Persistence for incidents, lookup tables, reporters, and the security
//! team using SQLx, with SQLite for development/testing and PostgreSQL for
//! production. Repositories are traits with one implementation per
//! backend, created through `create_*_repository` factory functions.

mod error;
mod pool;
mod schema;

pub mod analytics_repo;
pub mod incident_repo;
pub mod lookup_repo;
pub mod reporter_repo;
pub mod seed;
pub mod team_repo;

pub use error::DbError;
pub use pool::{create_pool, create_pool_with_options, DbPool, PoolOptions};
pub use schema::{run_migrations, SCHEMA_SQL};

pub use analytics_repo::{create_analytics_repository, AnalyticsRepository};
pub use incident_repo::{create_incident_repository, IncidentRepository};
pub use lookup_repo::{create_lookup_repository, LookupKind, LookupRepository};
pub use reporter_repo::{create_reporter_repository, ReporterRepository};
pub use seed::seed_database;
pub use team_repo::{create_team_repository, TeamRepository};
