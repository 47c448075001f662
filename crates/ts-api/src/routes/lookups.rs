//! Lookup-table endpoints consumed by the report form.

use axum::{extract::State, routing::get, Json, Router};

use crate::dto::{LookupResponse, TeamMemberResponse};
use crate::error::ApiError;
use crate::state::AppState;
use ts_core::db::{
    create_lookup_repository, create_team_repository, LookupKind, LookupRepository,
    TeamRepository,
};

/// Creates lookup routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/incident-types", get(incident_types))
        .route("/severity-levels", get(severity_levels))
        .route("/affected-systems", get(affected_systems))
        .route("/departments", get(departments))
        .route("/security-team", get(security_team))
}

async fn list_lookup(
    state: &AppState,
    kind: LookupKind,
) -> Result<Json<Vec<LookupResponse>>, ApiError> {
    let repo = create_lookup_repository(&state.db);
    let entries = repo.list(kind).await?;
    Ok(Json(entries.into_iter().map(Into::into).collect()))
}

async fn incident_types(
    State(state): State<AppState>,
) -> Result<Json<Vec<LookupResponse>>, ApiError> {
    list_lookup(&state, LookupKind::IncidentType).await
}

async fn severity_levels(
    State(state): State<AppState>,
) -> Result<Json<Vec<LookupResponse>>, ApiError> {
    list_lookup(&state, LookupKind::SeverityLevel).await
}

async fn affected_systems(
    State(state): State<AppState>,
) -> Result<Json<Vec<LookupResponse>>, ApiError> {
    list_lookup(&state, LookupKind::AffectedSystem).await
}

async fn departments(
    State(state): State<AppState>,
) -> Result<Json<Vec<LookupResponse>>, ApiError> {
    list_lookup(&state, LookupKind::Department).await
}

async fn security_team(
    State(state): State<AppState>,
) -> Result<Json<Vec<TeamMemberResponse>>, ApiError> {
    let repo = create_team_repository(&state.db);
    let members = repo.list_members().await?;
    Ok(Json(members.into_iter().map(Into::into).collect()))
}
