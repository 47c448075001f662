//! Threat-guideline endpoint.

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};

use crate::dto::GuidelinesResponse;
use crate::error::ApiError;
use crate::state::AppState;
use ts_core::db::{create_team_repository, TeamRepository};

/// Creates guideline routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/threat-guidelines/:type_id", get(threat_guidelines))
}

/// DO/DONT guidance for an incident type, grouped by category.
///
/// A type with no recorded guidelines yields empty groups, not an error.
async fn threat_guidelines(
    State(state): State<AppState>,
    Path(type_id): Path<i64>,
) -> Result<Json<GuidelinesResponse>, ApiError> {
    let repo = create_team_repository(&state.db);
    let guidelines = repo.guidelines_for_type(type_id).await?;

    Ok(Json(guidelines.into()))
}
