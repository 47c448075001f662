//! Incident data model.
//!
//! Incidents reference static lookup tables (type, severity, affected
//! system, status) by id. The structs here are the resolved shapes the
//! repositories return: joins have already replaced foreign keys with
//! human-readable names where callers need them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A row from one of the lookup tables (types, severities, statuses, ...).
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct LookupEntry {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
}

/// An incident as listed by the incident feed, with lookup names resolved.
///
/// Missing lookup rows resolve to `"Unknown"` rather than dropping the
/// incident from the list.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct IncidentSummary {
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

/// A compact recent-incident row for the dashboard feed.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct RecentIncident {
    pub incident_id: i64,
    pub incident_title: String,
    pub incident_type: String,
    pub severity: String,
    pub discovered_at: DateTime<Utc>,
}

/// Full incident detail, used by the report endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct IncidentDetail {
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

/// A fully-resolved incident ready for insertion.
///
/// All foreign keys have been validated against the lookup tables by the
/// caller; a name that did not resolve never reaches this struct.
#[derive(Debug, Clone)]
pub struct NewIncident {
    pub title: String,
    pub type_id: i64,
    pub severity_id: i64,
    pub system_id: i64,
    pub reporter_id: i64,
    pub status_id: i64,
    pub assigned_to: Option<i64>,
    pub discovered_at: DateTime<Utc>,
    pub reported_at: DateTime<Utc>,
    pub description: String,
    pub financial_impact: Option<f64>,
    pub initial_response: Option<String>,
}

/// An application user who can log in and submit incidents.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Reporter {
    pub reporter_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub contact_number: Option<String>,
    pub department_id: i64,
}

/// Data for creating a reporter account.
#[derive(Debug, Clone)]
pub struct NewReporter {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub contact_number: Option<String>,
    pub department_id: i64,
}

/// A security-team member with the role name resolved.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct SecurityTeamMember {
    pub member_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role_name: String,
}

/// A single DO or DONT advisory for an incident type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Guideline {
    pub description: String,
    pub risk_level: String,
}

/// Guidelines for an incident type, grouped by category.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GuidelineSet {
    #[serde(rename = "DO")]
    pub do_items: Vec<Guideline>,
    #[serde(rename = "DONT")]
    pub dont_items: Vec<Guideline>,
}

/// An (incident type, count) aggregate.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct TypeCount {
    pub name: String,
    pub count: i64,
}

/// A (severity, count) aggregate.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct SeverityCount {
    pub name: String,
    pub count: i64,
}

/// Incident count for one month of the dashboard window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyCount {
    /// Three-letter month label ("Jan" .. "Dec").
    pub month: String,
    pub incidents: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reporter_serialization_skips_password_hash() {
        let reporter = Reporter {
            reporter_id: 1,
            first_name: "Alice".to_string(),
            last_name: "Brown".to_string(),
            email: "alice.b@company.com".to_string(),
            password_hash: "$argon2id$v=19$secret".to_string(),
            contact_number: Some("+15550100".to_string()),
            department_id: 1,
        };

        let json = serde_json::to_string(&reporter).unwrap();
        assert!(!json.contains("argon2id"));
        assert!(json.contains("alice.b@company.com"));
    }

    #[test]
    fn test_guideline_set_serializes_with_category_keys() {
        let set = GuidelineSet {
            do_items: vec![Guideline {
                description: "Isolate the affected host".to_string(),
                risk_level: "HIGH".to_string(),
            }],
            dont_items: vec![],
        };

        let json = serde_json::to_value(&set).unwrap();
        assert!(json.get("DO").is_some());
        assert!(json.get("DONT").is_some());
    }
}
