//! API routes.

pub mod analytics;
pub mod auth;
pub mod guidelines;
pub mod health;
pub mod incidents;
pub mod lookups;
pub mod nl_query;
pub mod reports;
pub mod settings;

use crate::state::AppState;
use axum::Router;

/// Creates the main API router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api", api_routes())
        .merge(health::routes())
        .with_state(state)
}

/// Routes under the /api prefix.
fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(auth::routes())
        .merge(lookups::routes())
        .merge(guidelines::routes())
        .merge(incidents::routes())
        .merge(nl_query::routes())
        .merge(reports::routes())
        .nest("/analytics", analytics::routes())
        .nest("/settings", settings::routes())
}
