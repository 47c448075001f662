//! SQL guard for model-generated queries.
//!
//! Admits exactly one SELECT (or WITH ... SELECT) statement whose table
//! references are all schema tables. Anything else is rejected, including
//! keywords appearing inside string literals; the guard is deliberately
//! conservative because its input comes from an external model.

use super::NlqError;
use regex::Regex;
use std::sync::OnceLock;

/// Tables that guarded queries may reference.
pub const ALLOWED_TABLES: &[&str] = &[
    "incidents",
    "incident_types",
    "severity_levels",
    "incident_statuses",
    "criticality_levels",
    "system_types",
    "affected_systems",
    "departments",
    "security_roles",
    "security_team",
    "reporters",
    "threat_guidelines",
    "incident_logs",
    "incident_responses",
];

const FORBIDDEN_PATTERN: &str = r"(?i)\b(insert|update|delete|drop|alter|create|replace|truncate|grant|revoke|attach|detach|pragma|vacuum|copy|merge|exec|execute)\b";

const TABLE_REF_PATTERN: &str = r"(?i)\b(?:from|join)\s+([a-zA-Z_][a-zA-Z0-9_]*)";

fn forbidden_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(FORBIDDEN_PATTERN).expect("valid forbidden-keyword pattern"))
}

fn table_ref_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(TABLE_REF_PATTERN).expect("valid table-reference pattern"))
}

/// Validates that `sql` is a single read-only statement over allowed
/// tables.
pub fn ensure_read_only(sql: &str) -> Result<(), NlqError> {
    let trimmed = sql.trim().trim_end_matches(';').trim();

    if trimmed.is_empty() {
        return Err(NlqError::Rejected("empty statement".to_string()));
    }

    if trimmed.contains(';') {
        return Err(NlqError::Rejected(
            "multiple statements are not allowed".to_string(),
        ));
    }

    let first_word = trimmed
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .to_lowercase();
    if first_word != "select" && first_word != "with" {
        return Err(NlqError::Rejected(format!(
            "only SELECT statements are allowed, got '{}'",
            first_word
        )));
    }

    if let Some(found) = forbidden_regex().find(trimmed) {
        return Err(NlqError::Rejected(format!(
            "forbidden keyword '{}'",
            found.as_str().to_lowercase()
        )));
    }

    for capture in table_ref_regex().captures_iter(trimmed) {
        let table = capture[1].to_lowercase();
        if !ALLOWED_TABLES.contains(&table.as_str()) {
            return Err(NlqError::Rejected(format!(
                "table '{}' is not queryable",
                table
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rejected(sql: &str) -> bool {
        matches!(ensure_read_only(sql), Err(NlqError::Rejected(_)))
    }

    #[test]
    fn test_accepts_plain_select() {
        assert!(ensure_read_only("SELECT * FROM incidents").is_ok());
        assert!(ensure_read_only("select incident_title from incidents;").is_ok());
    }

    #[test]
    fn test_accepts_joins_and_cte() {
        assert!(ensure_read_only(
            "SELECT i.incident_title, sl.severity_name \
             FROM incidents i JOIN severity_levels sl ON i.severity_id = sl.severity_id"
        )
        .is_ok());

        assert!(ensure_read_only(
            "WITH counts AS (SELECT type_id, COUNT(*) AS n FROM incidents GROUP BY type_id) \
             SELECT * FROM counts"
        )
        .is_ok());
    }

    #[test]
    fn test_rejects_writes_and_ddl() {
        assert!(rejected("INSERT INTO incidents (incident_title) VALUES ('x')"));
        assert!(rejected("UPDATE incidents SET description = 'x'"));
        assert!(rejected("DELETE FROM incidents"));
        assert!(rejected("DROP TABLE incidents"));
        assert!(rejected("SELECT * FROM incidents; DROP TABLE incidents"));
    }

    #[test]
    fn test_rejects_unknown_tables() {
        assert!(rejected("SELECT * FROM sqlite_master"));
        assert!(rejected("SELECT * FROM incidents JOIN pg_tables ON 1=1"));
    }

    #[test]
    fn test_rejects_empty_and_non_select() {
        assert!(rejected(""));
        assert!(rejected(";;"));
        assert!(rejected("EXPLAIN SELECT * FROM incidents"));
    }

    #[test]
    fn test_timestamp_columns_do_not_trip_keyword_scan() {
        assert!(ensure_read_only(
            "SELECT created_at, updated_at FROM incidents ORDER BY created_at DESC"
        )
        .is_ok());
    }

    #[test]
    fn test_subquery_inner_tables_are_checked() {
        assert!(ensure_read_only(
            "SELECT * FROM (SELECT incident_id FROM incidents) sub"
        )
        .is_ok());
        assert!(rejected(
            "SELECT * FROM (SELECT secret FROM credentials) sub"
        ));
    }
}
