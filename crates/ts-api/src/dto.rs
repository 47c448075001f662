//! Data Transfer Objects for API requests and responses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use ts_core::{
    Guideline, GuidelineSet, IncidentDetail, IncidentSummary, Reporter, SecurityTeamMember,
};

// ============================================================================
// Auth DTOs
// ============================================================================

/// Login request.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

/// Reporter profile returned to clients. Never carries the password hash.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ReporterProfile {
    pub reporter_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub contact_number: Option<String>,
    pub department_id: i64,
}

impl From<Reporter> for ReporterProfile {
    fn from(reporter: Reporter) -> Self {
        Self {
            reporter_id: reporter.reporter_id,
            first_name: reporter.first_name,
            last_name: reporter.last_name,
            email: reporter.email,
            contact_number: reporter.contact_number,
            department_id: reporter.department_id,
        }
    }
}

/// Login response with a signed session token.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    pub success: bool,
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub user: ReporterProfile,
}

/// Generic success/message response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StatusResponse {
    pub success: bool,
    pub message: String,
}

// ============================================================================
// Incident DTOs
// ============================================================================

/// An incident in the list response, lookup names resolved.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct IncidentResponse {
    pub incident_id: i64,
    pub incident_title: String,
    pub incident_type: String,
    pub severity: String,
    pub affected_system: String,
    pub department: String,
    pub status: String,
    pub discovered_at: DateTime<Utc>,
    pub description: String,
    pub financial_impact: Option<f64>,
}

impl From<IncidentSummary> for IncidentResponse {
    fn from(summary: IncidentSummary) -> Self {
        Self {
            incident_id: summary.incident_id,
            incident_title: summary.incident_title,
            incident_type: summary.incident_type,
            severity: summary.severity,
            affected_system: summary.affected_system,
            department: summary.department,
            status: summary.status,
            discovered_at: summary.discovered_at,
            description: summary.description,
            financial_impact: summary.financial_impact,
        }
    }
}

/// Incident submission payload. Lookup values are names; they are resolved
/// against the lookup tables and a miss fails the request.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateIncidentRequest {
    #[validate(length(min = 1))]
    pub incident_type: String,
    #[validate(length(min = 1))]
    pub severity: String,
    #[validate(length(min = 1))]
    pub affected_system: String,
    #[validate(length(min = 1))]
    pub department: String,
    #[validate(length(min = 1))]
    pub description: String,
    pub initial_response: Option<String>,
    pub financial_impact: Option<f64>,
    /// When the incident was discovered; defaults to now.
    pub discovered_at: Option<DateTime<Utc>>,
}

/// Response to an incident submission.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateIncidentResponse {
    pub success: bool,
    pub message: String,
    pub incident_id: i64,
    pub incident_title: String,
    pub assigned_to: Option<String>,
    pub guidelines: GuidelinesResponse,
}

/// Assignment request for an incident.
#[derive(Debug, Deserialize, ToSchema)]
pub struct AssignRequest {
    pub member_id: i64,
    /// Status to move the incident to.
    #[serde(default = "default_assign_status")]
    pub status: String,
}

fn default_assign_status() -> String {
    "Investigation".to_string()
}

/// Response to an assignment.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AssignResponse {
    pub success: bool,
    pub message: String,
    pub incident_id: i64,
    pub member_id: i64,
    pub status: String,
}

// ============================================================================
// Guideline DTOs
// ============================================================================

/// A single advisory entry.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct GuidelineResponse {
    pub description: String,
    pub risk_level: String,
}

impl From<Guideline> for GuidelineResponse {
    fn from(guideline: Guideline) -> Self {
        Self {
            description: guideline.description,
            risk_level: guideline.risk_level,
        }
    }
}

/// Guidelines grouped by category.
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct GuidelinesResponse {
    #[serde(rename = "DO")]
    pub do_items: Vec<GuidelineResponse>,
    #[serde(rename = "DONT")]
    pub dont_items: Vec<GuidelineResponse>,
}

impl From<GuidelineSet> for GuidelinesResponse {
    fn from(set: GuidelineSet) -> Self {
        Self {
            do_items: set.do_items.into_iter().map(Into::into).collect(),
            dont_items: set.dont_items.into_iter().map(Into::into).collect(),
        }
    }
}

// ============================================================================
// Lookup / team DTOs
// ============================================================================

/// A lookup-table row.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LookupResponse {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
}

impl From<ts_core::LookupEntry> for LookupResponse {
    fn from(entry: ts_core::LookupEntry) -> Self {
        Self {
            id: entry.id,
            name: entry.name,
            description: entry.description,
        }
    }
}

/// A security-team member.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TeamMemberResponse {
    pub member_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role_name: String,
}

impl From<SecurityTeamMember> for TeamMemberResponse {
    fn from(member: SecurityTeamMember) -> Self {
        Self {
            member_id: member.member_id,
            first_name: member.first_name,
            last_name: member.last_name,
            email: member.email,
            role_name: member.role_name,
        }
    }
}

// ============================================================================
// NL query DTOs
// ============================================================================

/// Natural-language query request.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct NlQueryRequest {
    #[validate(length(min = 1))]
    pub query: String,
}

/// Translated query with its guarded execution results.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct NlQueryResponse {
    pub sql_query: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Request for the rendered incident INSERT statement.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct GenerateInsertRequest {
    /// Title to use; generated from the incident type when absent.
    pub title: Option<String>,
    #[validate(length(min = 1))]
    pub incident_type: String,
    #[validate(length(min = 1))]
    pub severity: String,
    #[validate(length(min = 1))]
    pub affected_system: String,
    #[validate(length(min = 1))]
    pub description: String,
}

/// Rendered INSERT statement preview.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct GenerateInsertResponse {
    pub sql_query: String,
}

/// Direct query execution request.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ExecuteQueryRequest {
    #[validate(length(min = 1))]
    pub query: String,
}

/// Direct query execution results.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ExecuteQueryResponse {
    pub success: bool,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

// ============================================================================
// Settings DTOs
// ============================================================================

/// Password change request. The reporter comes from the session token.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdatePasswordRequest {
    #[validate(length(min = 1))]
    pub current_password: String,
    #[validate(length(min = 1))]
    pub new_password: String,
}

/// Contact-number change request.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdatePhoneRequest {
    #[validate(length(min = 1))]
    pub contact_number: String,
}

// ============================================================================
// Analytics DTOs
// ============================================================================

/// Headline dashboard numbers.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AnalyticsSummaryResponse {
    pub total_incidents: u64,
    pub critical_incidents: u64,
    pub active_incidents: u64,
    pub most_common_type: Option<TypeSliceResponse>,
    pub active_departments: u64,
    pub total_departments: u64,
}

/// One slice of the severity distribution, with a chart color.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SeveritySliceResponse {
    pub name: String,
    pub value: i64,
    pub color: String,
}

/// One slice of the incident-type distribution.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TypeSliceResponse {
    pub name: String,
    pub value: i64,
}

/// One month of the incident trend.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MonthlyCountResponse {
    pub month: String,
    pub incidents: i64,
}

// ============================================================================
// Report DTOs
// ============================================================================

/// Full incident detail for the report.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct IncidentReportDetail {
    pub incident_id: i64,
    pub incident_title: String,
    pub incident_type: String,
    pub severity: String,
    pub affected_system: String,
    pub department: String,
    pub status: String,
    pub reporter_name: String,
    pub assigned_to: Option<String>,
    pub discovered_at: DateTime<Utc>,
    pub reported_at: DateTime<Utc>,
    pub description: String,
    pub financial_impact: Option<f64>,
}

impl From<IncidentDetail> for IncidentReportDetail {
    fn from(detail: IncidentDetail) -> Self {
        Self {
            incident_id: detail.incident_id,
            incident_title: detail.incident_title,
            incident_type: detail.incident_type,
            severity: detail.severity,
            affected_system: detail.affected_system,
            department: detail.department,
            status: detail.status,
            reporter_name: detail.reporter_name,
            assigned_to: detail.assigned_to,
            discovered_at: detail.discovered_at,
            reported_at: detail.reported_at,
            description: detail.description,
            financial_impact: detail.financial_impact,
        }
    }
}

/// Structured incident report: the summary plus response guidelines.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct IncidentReportResponse {
    pub report_title: String,
    pub incident: IncidentReportDetail,
    pub guidelines: GuidelinesResponse,
}
