//! Dashboard analytics endpoints.

use axum::{extract::State, routing::get, Json, Router};

use crate::dto::{
    AnalyticsSummaryResponse, MonthlyCountResponse, SeveritySliceResponse, TypeSliceResponse,
};
use crate::error::ApiError;
use crate::state::AppState;
use ts_core::db::{create_analytics_repository, AnalyticsRepository};

/// Chart slices returned for the type distribution.
const TYPE_DISTRIBUTION_LIMIT: i64 = 5;

/// Creates analytics routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/summary", get(summary))
        .route("/severity-distribution", get(severity_distribution))
        .route("/type-distribution", get(type_distribution))
        .route("/monthly", get(monthly))
}

/// Chart color for a severity name.
fn severity_color(name: &str) -> &'static str {
    match name {
        "Critical" => "#ef4444",
        "High" => "#f97316",
        "Medium" => "#eab308",
        _ => "#22c55e",
    }
}

/// Headline dashboard numbers.
#[utoipa::path(
    get,
    path = "/api/analytics/summary",
    responses(
        (status = 200, description = "Dashboard summary", body = AnalyticsSummaryResponse),
        (status = 500, description = "Internal server error")
    ),
    tag = "Analytics"
)]
pub async fn summary(
    State(state): State<AppState>,
) -> Result<Json<AnalyticsSummaryResponse>, ApiError> {
    let repo = create_analytics_repository(&state.db);

    let total_incidents = repo.total_incidents().await?;
    let critical_incidents = repo.critical_incidents().await?;
    let active_incidents = repo.active_incidents().await?;
    let most_common_type = repo.most_common_type().await?.map(|t| TypeSliceResponse {
        name: t.name,
        value: t.count,
    });
    let active_departments = repo.active_departments().await?;
    let total_departments = repo.total_departments().await?;

    Ok(Json(AnalyticsSummaryResponse {
        total_incidents,
        critical_incidents,
        active_incidents,
        most_common_type,
        active_departments,
        total_departments,
    }))
}

/// One slice per severity present in the incidents table.
async fn severity_distribution(
    State(state): State<AppState>,
) -> Result<Json<Vec<SeveritySliceResponse>>, ApiError> {
    let repo = create_analytics_repository(&state.db);
    let distribution = repo.severity_distribution().await?;

    Ok(Json(
        distribution
            .into_iter()
            .map(|s| SeveritySliceResponse {
                color: severity_color(&s.name).to_string(),
                name: s.name,
                value: s.count,
            })
            .collect(),
    ))
}

/// Top incident types by count.
async fn type_distribution(
    State(state): State<AppState>,
) -> Result<Json<Vec<TypeSliceResponse>>, ApiError> {
    let repo = create_analytics_repository(&state.db);
    let distribution = repo.type_distribution(TYPE_DISTRIBUTION_LIMIT).await?;

    Ok(Json(
        distribution
            .into_iter()
            .map(|t| TypeSliceResponse {
                name: t.name,
                value: t.count,
            })
            .collect(),
    ))
}

/// Trailing six-month incident trend, zero-filled.
async fn monthly(
    State(state): State<AppState>,
) -> Result<Json<Vec<MonthlyCountResponse>>, ApiError> {
    let repo = create_analytics_repository(&state.db);
    let trend = repo.monthly_incidents().await?;

    Ok(Json(
        trend
            .into_iter()
            .map(|m| MonthlyCountResponse {
                month: m.month,
                incidents: m.incidents,
            })
            .collect(),
    ))
}
