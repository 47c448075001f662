//! Incident report endpoint.
//!
//! Returns the structured report data (summary plus response guidelines);
//! document rendering is a client concern.

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};

use crate::dto::IncidentReportResponse;
use crate::error::ApiError;
use crate::state::AppState;
use ts_core::db::{
    create_incident_repository, create_lookup_repository, create_team_repository, DbError,
    IncidentRepository, LookupKind, LookupRepository, TeamRepository,
};
use ts_core::GuidelineSet;

/// Creates report routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/generate-report/:id", get(generate_report))
}

/// Full report data for one incident.
#[utoipa::path(
    get,
    path = "/api/generate-report/{id}",
    params(
        ("id" = i64, Path, description = "Incident ID")
    ),
    responses(
        (status = 200, description = "Structured incident report", body = IncidentReportResponse),
        (status = 404, description = "Incident not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Reports"
)]
pub async fn generate_report(
    State(state): State<AppState>,
    Path(incident_id): Path<i64>,
) -> Result<Json<IncidentReportResponse>, ApiError> {
    let incidents = create_incident_repository(&state.db);
    let lookups = create_lookup_repository(&state.db);
    let team = create_team_repository(&state.db);

    let detail = incidents
        .get_detail(incident_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Incident {} not found", incident_id)))?;

    // An incident whose type row has gone missing reports with empty
    // guidelines rather than failing.
    let guidelines = match lookups
        .id_by_name(LookupKind::IncidentType, &detail.incident_type)
        .await
    {
        Ok(type_id) => team.guidelines_for_type(type_id).await?,
        Err(DbError::NotFound { .. }) => GuidelineSet::default(),
        Err(err) => return Err(err.into()),
    };

    Ok(Json(IncidentReportResponse {
        report_title: format!("Cybersecurity Incident Report #{}", incident_id),
        incident: detail.into(),
        guidelines: guidelines.into(),
    }))
}
