//! Natural-language query endpoints.
//!
//! `generate-query` round-trips the question through the hosted model and
//! executes the result under the read-only guard. `execute-query` runs
//! caller-supplied SQL under the same guard. `generate-insert-query`
//! renders the fixed INSERT template for display; the actual insert always
//! goes through `POST /api/incidents`.

use axum::{extract::State, routing::post, Json, Router};
use tracing::info;
use validator::Validate;

use crate::dto::{
    ExecuteQueryRequest, ExecuteQueryResponse, GenerateInsertRequest, GenerateInsertResponse,
    NlQueryRequest, NlQueryResponse,
};
use crate::error::ApiError;
use crate::state::AppState;
use ts_core::db::{create_lookup_repository, DbError, LookupKind, LookupRepository};
use ts_core::nlq::{execute_readonly, render_insert_template, InsertTemplate};
use ts_core::{generate_incident_title, QueryTranslator};

/// Reporter and status recorded in the rendered INSERT preview.
const TEMPLATE_REPORTER_ID: i64 = 1;

/// Creates NL query routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/generate-query", post(generate_query))
        .route("/generate-insert-query", post(generate_insert_query))
        .route("/execute-query", post(execute_query))
}

/// Translate a natural-language question to SQL and run it.
async fn generate_query(
    State(state): State<AppState>,
    Json(request): Json<NlQueryRequest>,
) -> Result<Json<NlQueryResponse>, ApiError> {
    request.validate()?;

    let sql_query = state.translator.translate(&request.query).await?;
    info!(sql = %sql_query, "Generated SQL query");

    let results = execute_readonly(&state.db, &sql_query).await?;

    Ok(Json(NlQueryResponse {
        sql_query,
        columns: results.columns,
        rows: results.rows,
    }))
}

/// Render the incident INSERT statement for a submission payload.
async fn generate_insert_query(
    State(state): State<AppState>,
    Json(request): Json<GenerateInsertRequest>,
) -> Result<Json<GenerateInsertResponse>, ApiError> {
    request.validate()?;

    let lookups = create_lookup_repository(&state.db);

    let resolve = |err: DbError| match err {
        DbError::NotFound { entity, id } => {
            ApiError::BadRequest(format!("Unknown {}: '{}'", entity, id))
        }
        err => err.into(),
    };

    let type_id = lookups
        .id_by_name(LookupKind::IncidentType, &request.incident_type)
        .await
        .map_err(resolve)?;
    let severity_id = lookups
        .id_by_name(LookupKind::SeverityLevel, &request.severity)
        .await
        .map_err(resolve)?;
    let system_id = lookups
        .id_by_name(LookupKind::AffectedSystem, &request.affected_system)
        .await
        .map_err(resolve)?;
    let status_id = lookups
        .id_by_name(LookupKind::IncidentStatus, "Open")
        .await?;

    let title = request
        .title
        .clone()
        .unwrap_or_else(|| generate_incident_title(&request.incident_type));

    let sql_query = render_insert_template(&InsertTemplate {
        title,
        type_id,
        severity_id,
        system_id,
        reporter_id: TEMPLATE_REPORTER_ID,
        status_id,
        description: request.description.clone(),
    });

    Ok(Json(GenerateInsertResponse { sql_query }))
}

/// Run caller-supplied SQL under the read-only guard.
async fn execute_query(
    State(state): State<AppState>,
    Json(request): Json<ExecuteQueryRequest>,
) -> Result<Json<ExecuteQueryResponse>, ApiError> {
    request.validate()?;

    let results = execute_readonly(&state.db, &request.query).await?;

    Ok(Json(ExecuteQueryResponse {
        success: true,
        columns: results.columns,
        rows: results.rows,
    }))
}
