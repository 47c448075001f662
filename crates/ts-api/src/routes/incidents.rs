//! Incident management endpoints.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use chrono::Utc;
use tracing::info;
use validator::Validate;

use crate::auth::OptionalReporter;
use crate::dto::{
    AssignRequest, AssignResponse, CreateIncidentRequest, CreateIncidentResponse,
    IncidentResponse,
};
use crate::error::ApiError;
use crate::state::AppState;
use ts_core::db::{
    create_incident_repository, create_lookup_repository, create_team_repository, DbError,
    IncidentRepository, LookupKind, LookupRepository, TeamRepository,
};
use ts_core::{generate_incident_title, NewIncident};

/// Reporter recorded for unauthenticated submissions.
const DEFAULT_REPORTER_ID: i64 = 1;

/// Creates incident routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/incidents", get(list_incidents).post(create_incident))
        .route("/incidents/:id/assign", put(assign_incident))
}

/// Maps a lookup miss to a client error: submitting a name absent from the
/// lookup tables is a bad request, not a silent NULL foreign key.
fn lookup_error(err: DbError) -> ApiError {
    match err {
        DbError::NotFound { entity, id } => {
            ApiError::BadRequest(format!("Unknown {}: '{}'", entity, id))
        }
        err => err.into(),
    }
}

/// List all incidents with lookup names resolved.
#[utoipa::path(
    get,
    path = "/api/incidents",
    responses(
        (status = 200, description = "All incidents, most recent first", body = [IncidentResponse]),
        (status = 500, description = "Internal server error")
    ),
    tag = "Incidents"
)]
pub async fn list_incidents(
    State(state): State<AppState>,
) -> Result<Json<Vec<IncidentResponse>>, ApiError> {
    let repo = create_incident_repository(&state.db);
    let incidents = repo.list().await?;

    Ok(Json(incidents.into_iter().map(Into::into).collect()))
}

/// Submit an incident report.
///
/// Resolves the submitted names against the lookup tables, synthesizes a
/// stylized title, and creates the incident in one transaction together
/// with the security-team assignment. The response carries the DO/DONT
/// guidelines for the incident type.
#[utoipa::path(
    post,
    path = "/api/incidents",
    request_body = CreateIncidentRequest,
    responses(
        (status = 201, description = "Incident created", body = CreateIncidentResponse),
        (status = 400, description = "Unknown lookup name"),
        (status = 422, description = "Validation failure"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Incidents"
)]
pub async fn create_incident(
    State(state): State<AppState>,
    OptionalReporter(claims): OptionalReporter,
    Json(request): Json<CreateIncidentRequest>,
) -> Result<(StatusCode, Json<CreateIncidentResponse>), ApiError> {
    request.validate()?;

    let lookups = create_lookup_repository(&state.db);
    let team = create_team_repository(&state.db);
    let incidents = create_incident_repository(&state.db);

    let type_id = lookups
        .id_by_name(LookupKind::IncidentType, &request.incident_type)
        .await
        .map_err(lookup_error)?;
    let severity_id = lookups
        .id_by_name(LookupKind::SeverityLevel, &request.severity)
        .await
        .map_err(lookup_error)?;
    let system_id = lookups
        .id_by_name(LookupKind::AffectedSystem, &request.affected_system)
        .await
        .map_err(lookup_error)?;
    // The department is stored via the reporter, but a bad name is still a
    // client error.
    lookups
        .id_by_name(LookupKind::Department, &request.department)
        .await
        .map_err(lookup_error)?;

    let assignee = team.first_available().await?;
    let status_name = if assignee.is_some() {
        "Investigation"
    } else {
        "Open"
    };
    let status_id = lookups
        .id_by_name(LookupKind::IncidentStatus, status_name)
        .await?;

    let title = generate_incident_title(&request.incident_type);
    let now = Utc::now();
    let reporter_id = claims
        .map(|c| c.reporter_id)
        .unwrap_or(DEFAULT_REPORTER_ID);

    let incident = NewIncident {
        title: title.clone(),
        type_id,
        severity_id,
        system_id,
        reporter_id,
        status_id,
        assigned_to: assignee.as_ref().map(|m| m.member_id),
        discovered_at: request.discovered_at.unwrap_or(now),
        reported_at: now,
        description: request.description.clone(),
        financial_impact: request.financial_impact,
        initial_response: request.initial_response.clone(),
    };

    let incident_id = incidents.create(&incident).await?;
    let guidelines = team.guidelines_for_type(type_id).await?;

    info!(
        incident_id,
        incident_type = %request.incident_type,
        title = %title,
        "Incident reported"
    );

    Ok((
        StatusCode::CREATED,
        Json(CreateIncidentResponse {
            success: true,
            message: "Incident reported successfully".to_string(),
            incident_id,
            incident_title: title,
            assigned_to: assignee.map(|m| format!("{} {}", m.first_name, m.last_name)),
            guidelines: guidelines.into(),
        }),
    ))
}

/// Assign a security-team member to an incident.
#[utoipa::path(
    put,
    path = "/api/incidents/{id}/assign",
    params(
        ("id" = i64, Path, description = "Incident ID")
    ),
    request_body = AssignRequest,
    responses(
        (status = 200, description = "Assignment recorded", body = AssignResponse),
        (status = 400, description = "Invalid status"),
        (status = 404, description = "Incident not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Incidents"
)]
pub async fn assign_incident(
    State(state): State<AppState>,
    Path(incident_id): Path<i64>,
    Json(request): Json<AssignRequest>,
) -> Result<Json<AssignResponse>, ApiError> {
    let lookups = create_lookup_repository(&state.db);
    let incidents = create_incident_repository(&state.db);

    let status_id = lookups
        .id_by_name(LookupKind::IncidentStatus, &request.status)
        .await
        .map_err(|err| match err {
            DbError::NotFound { .. } => {
                ApiError::BadRequest(format!("Invalid status: {}", request.status))
            }
            err => err.into(),
        })?;

    incidents
        .assign(incident_id, request.member_id, status_id)
        .await?;

    info!(
        incident_id,
        member_id = request.member_id,
        status = %request.status,
        "Incident assigned"
    );

    Ok(Json(AssignResponse {
        success: true,
        message: "Security team member assigned successfully".to_string(),
        incident_id,
        member_id: request.member_id,
        status: request.status,
    }))
}
