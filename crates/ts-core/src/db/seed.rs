//! Database seeding.
//!
//! Inserts fixture rows in dependency order: lookup tables first, then
//! rows that reference them. Lookup inserts are idempotent on their unique
//! name columns; sample incidents and guidelines are only seeded into an
//! empty table. Reporter passwords are hashed before they are stored.

use super::{DbError, DbPool};
use crate::auth::password::hash_password;
use chrono::{DateTime, Utc};
use tracing::info;

/// Password assigned to seeded reporter accounts.
pub const DEFAULT_REPORTER_PASSWORD: &str = "ChangeMe123";

const INCIDENT_TYPES: &[(&str, &str)] = &[
    ("Ransomware", "Malicious software that encrypts data for ransom"),
    ("Phishing", "Social engineering attacks via email or messaging"),
    ("DDoS", "Distributed Denial of Service attacks"),
    ("Data Breach", "Unauthorized access to sensitive data"),
    ("Malware", "Malicious software infection"),
    ("Unauthorized Access", "Access to systems without permission"),
];

const SEVERITY_LEVELS: &[(&str, &str)] = &[
    ("Critical", "Severe impact on core business operations"),
    ("High", "Significant impact on critical services"),
    ("Medium", "Moderate impact on business functions"),
    ("Low", "Minimal impact on operations"),
];

const INCIDENT_STATUSES: &[(&str, &str)] = &[
    ("Open", "Incident is active and being investigated"),
    ("Investigation", "Assigned to the security team for investigation"),
    ("In Progress", "Investigation and response ongoing"),
    ("Resolved", "Incident has been resolved"),
    ("Closed", "Investigation completed and documented"),
];

const CRITICALITY_LEVELS: &[(&str, &str)] = &[
    ("LOW", "Minimal impact on operations"),
    ("MEDIUM", "Moderate impact on business functions"),
    ("HIGH", "Significant impact on critical services"),
    ("CRITICAL", "Severe impact on core business operations"),
];

const SYSTEM_TYPES: &[(&str, &str)] = &[
    ("Server", "Server systems"),
    ("Database", "Database systems"),
    ("Application", "Web and internal applications"),
];

const DEPARTMENTS: &[&str] = &["IT", "Finance", "HR"];

const SECURITY_ROLES: &[&str] = &[
    "Incident Commander",
    "Security Analyst",
    "Forensics Specialist",
];

/// (system name, system type, criticality level)
const AFFECTED_SYSTEMS: &[(&str, &str, &str)] = &[
    ("Email Server", "Server", "CRITICAL"),
    ("Customer Database", "Database", "CRITICAL"),
    ("File Server", "Server", "HIGH"),
    ("Web Application", "Application", "CRITICAL"),
    ("Employee Portal", "Application", "HIGH"),
];

/// (first name, last name, email, role)
const SECURITY_TEAM: &[(&str, &str, &str, &str)] = &[
    ("John", "Smith", "john.smith@security.com", "Incident Commander"),
    ("Sarah", "Johnson", "sarah.j@security.com", "Security Analyst"),
    ("Michael", "Chen", "michael.c@security.com", "Forensics Specialist"),
];

/// (first name, last name, email, department)
const REPORTERS: &[(&str, &str, &str, &str)] = &[
    ("Alice", "Brown", "alice.b@company.com", "IT"),
    ("Bob", "Wilson", "bob.w@company.com", "Finance"),
    ("Carol", "Davis", "carol.d@company.com", "HR"),
];

/// (incident type, category, description, risk level)
const GUIDELINES: &[(&str, &str, &str, &str)] = &[
    ("Ransomware", "DO", "Isolate infected systems from the network immediately", "CRITICAL"),
    ("Ransomware", "DO", "Preserve encrypted files and ransom notes for forensics", "HIGH"),
    ("Ransomware", "DONT", "Do not pay the ransom without consulting legal counsel", "CRITICAL"),
    ("Ransomware", "DONT", "Do not power off machines before capturing volatile memory", "MEDIUM"),
    ("Phishing", "DO", "Reset any credentials entered on the suspicious page", "CRITICAL"),
    ("Phishing", "DO", "Report the message to the security team and delete it", "HIGH"),
    ("Phishing", "DONT", "Do not click links or open attachments from the message", "CRITICAL"),
    ("Phishing", "DONT", "Do not forward the email to colleagues", "LOW"),
    ("DDoS", "DO", "Enable upstream rate limiting and traffic filtering", "HIGH"),
    ("DDoS", "DONT", "Do not restart edge services repeatedly during the attack", "MEDIUM"),
    ("Data Breach", "DO", "Identify and contain the exposed data set", "CRITICAL"),
    ("Data Breach", "DONT", "Do not discuss details outside the response team", "HIGH"),
    ("Malware", "DO", "Quarantine the affected host and run a full scan", "HIGH"),
    ("Malware", "DONT", "Do not reconnect the host before it is cleared", "HIGH"),
    ("Unauthorized Access", "DO", "Disable the compromised account and rotate credentials", "CRITICAL"),
    ("Unauthorized Access", "DONT", "Do not delete audit logs from the affected system", "CRITICAL"),
];

/// (title, type, severity, system, reporter email, status, discovered_at,
/// reported_at, description, financial impact)
#[allow(clippy::type_complexity)]
const SAMPLE_INCIDENTS: &[(
    &str,
    &str,
    &str,
    &str,
    &str,
    &str,
    &str,
    &str,
    &str,
    f64,
)] = &[
    (
        "Ransomware Attack on File Server",
        "Ransomware",
        "Critical",
        "File Server",
        "alice.b@company.com",
        "Open",
        "2024-03-15T10:30:00Z",
        "2024-03-15T10:35:00Z",
        "File server encrypted by ransomware, ransom note found",
        50_000.0,
    ),
    (
        "Phishing Campaign Detected",
        "Phishing",
        "High",
        "Email Server",
        "bob.w@company.com",
        "Open",
        "2024-03-14T15:45:00Z",
        "2024-03-14T16:00:00Z",
        "Multiple employees reported suspicious emails",
        5_000.0,
    ),
];

fn fixture_time(value: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(value)
        .expect("valid fixture timestamp")
        .with_timezone(&Utc)
}

/// Seeds the database with fixture data.
pub async fn seed_database(pool: &DbPool) -> Result<(), DbError> {
    match pool {
        DbPool::Sqlite(p) => seed_sqlite(p).await,
        DbPool::Postgres(p) => seed_postgres(p).await,
    }
}

async fn seed_sqlite(pool: &sqlx::SqlitePool) -> Result<(), DbError> {
    for (name, description) in INCIDENT_TYPES {
        sqlx::query("INSERT OR IGNORE INTO incident_types (type_name, description) VALUES (?, ?)")
            .bind(name)
            .bind(description)
            .execute(pool)
            .await?;
    }

    for (name, description) in SEVERITY_LEVELS {
        sqlx::query(
            "INSERT OR IGNORE INTO severity_levels (severity_name, description) VALUES (?, ?)",
        )
        .bind(name)
        .bind(description)
        .execute(pool)
        .await?;
    }

    for (name, description) in INCIDENT_STATUSES {
        sqlx::query(
            "INSERT OR IGNORE INTO incident_statuses (status_name, description) VALUES (?, ?)",
        )
        .bind(name)
        .bind(description)
        .execute(pool)
        .await?;
    }

    for (name, description) in CRITICALITY_LEVELS {
        sqlx::query(
            "INSERT OR IGNORE INTO criticality_levels (level_name, description) VALUES (?, ?)",
        )
        .bind(name)
        .bind(description)
        .execute(pool)
        .await?;
    }

    for (name, description) in SYSTEM_TYPES {
        sqlx::query("INSERT OR IGNORE INTO system_types (type_name, description) VALUES (?, ?)")
            .bind(name)
            .bind(description)
            .execute(pool)
            .await?;
    }

    for name in DEPARTMENTS {
        sqlx::query("INSERT OR IGNORE INTO departments (department_name) VALUES (?)")
            .bind(name)
            .execute(pool)
            .await?;
    }

    for name in SECURITY_ROLES {
        sqlx::query("INSERT OR IGNORE INTO security_roles (role_name) VALUES (?)")
            .bind(name)
            .execute(pool)
            .await?;
    }

    for (name, system_type, criticality) in AFFECTED_SYSTEMS {
        sqlx::query(
            "INSERT OR IGNORE INTO affected_systems (system_name, system_type_id, criticality_id)
             SELECT ?, st.system_type_id, cl.criticality_id
             FROM system_types st, criticality_levels cl
             WHERE st.type_name = ? AND cl.level_name = ?",
        )
        .bind(name)
        .bind(system_type)
        .bind(criticality)
        .execute(pool)
        .await?;
    }

    for (first, last, email, role) in SECURITY_TEAM {
        sqlx::query(
            "INSERT OR IGNORE INTO security_team (first_name, last_name, email, role_id)
             SELECT ?, ?, ?, role_id FROM security_roles WHERE role_name = ?",
        )
        .bind(first)
        .bind(last)
        .bind(email)
        .bind(role)
        .execute(pool)
        .await?;
    }

    for (first, last, email, department) in REPORTERS {
        let password_hash = hash_password(DEFAULT_REPORTER_PASSWORD)
            .map_err(|e| DbError::Configuration(e.to_string()))?;
        sqlx::query(
            "INSERT OR IGNORE INTO reporters
                (first_name, last_name, email, password_hash, contact_number, department_id)
             SELECT ?, ?, ?, ?, NULL, department_id
             FROM departments WHERE department_name = ?",
        )
        .bind(first)
        .bind(last)
        .bind(email)
        .bind(&password_hash)
        .bind(department)
        .execute(pool)
        .await?;
    }

    let guideline_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM threat_guidelines")
        .fetch_one(pool)
        .await?;
    if guideline_count == 0 {
        for (incident_type, category, description, risk) in GUIDELINES {
            sqlx::query(
                "INSERT INTO threat_guidelines
                    (type_id, guideline_category, guideline_description, risk_level)
                 SELECT type_id, ?, ?, ? FROM incident_types WHERE type_name = ?",
            )
            .bind(category)
            .bind(description)
            .bind(risk)
            .bind(incident_type)
            .execute(pool)
            .await?;
        }
    }

    let incident_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM incidents")
        .fetch_one(pool)
        .await?;
    if incident_count == 0 {
        for (title, itype, severity, system, reporter, status, discovered, reported, desc, impact) in
            SAMPLE_INCIDENTS
        {
            sqlx::query(
                "INSERT INTO incidents
                    (incident_title, type_id, severity_id, system_id, reporter_id, status_id,
                     discovered_at, reported_at, description, financial_impact,
                     created_at, updated_at)
                 SELECT ?, it.type_id, sl.severity_id, a.system_id, r.reporter_id, st.status_id,
                        ?, ?, ?, ?, ?, ?
                 FROM incident_types it, severity_levels sl, affected_systems a,
                      reporters r, incident_statuses st
                 WHERE it.type_name = ? AND sl.severity_name = ? AND a.system_name = ?
                   AND r.email = ? AND st.status_name = ?",
            )
            .bind(title)
            .bind(fixture_time(discovered))
            .bind(fixture_time(reported))
            .bind(desc)
            .bind(impact)
            .bind(Utc::now())
            .bind(Utc::now())
            .bind(itype)
            .bind(severity)
            .bind(system)
            .bind(reporter)
            .bind(status)
            .execute(pool)
            .await?;
        }
    }

    info!("Database seeding completed");
    Ok(())
}

async fn seed_postgres(pool: &sqlx::PgPool) -> Result<(), DbError> {
    for (name, description) in INCIDENT_TYPES {
        sqlx::query(
            "INSERT INTO incident_types (type_name, description) VALUES ($1, $2)
             ON CONFLICT (type_name) DO NOTHING",
        )
        .bind(name)
        .bind(description)
        .execute(pool)
        .await?;
    }

    for (name, description) in SEVERITY_LEVELS {
        sqlx::query(
            "INSERT INTO severity_levels (severity_name, description) VALUES ($1, $2)
             ON CONFLICT (severity_name) DO NOTHING",
        )
        .bind(name)
        .bind(description)
        .execute(pool)
        .await?;
    }

    for (name, description) in INCIDENT_STATUSES {
        sqlx::query(
            "INSERT INTO incident_statuses (status_name, description) VALUES ($1, $2)
             ON CONFLICT (status_name) DO NOTHING",
        )
        .bind(name)
        .bind(description)
        .execute(pool)
        .await?;
    }

    for (name, description) in CRITICALITY_LEVELS {
        sqlx::query(
            "INSERT INTO criticality_levels (level_name, description) VALUES ($1, $2)
             ON CONFLICT (level_name) DO NOTHING",
        )
        .bind(name)
        .bind(description)
        .execute(pool)
        .await?;
    }

    for (name, description) in SYSTEM_TYPES {
        sqlx::query(
            "INSERT INTO system_types (type_name, description) VALUES ($1, $2)
             ON CONFLICT (type_name) DO NOTHING",
        )
        .bind(name)
        .bind(description)
        .execute(pool)
        .await?;
    }

    for name in DEPARTMENTS {
        sqlx::query(
            "INSERT INTO departments (department_name) VALUES ($1)
             ON CONFLICT (department_name) DO NOTHING",
        )
        .bind(name)
        .execute(pool)
        .await?;
    }

    for name in SECURITY_ROLES {
        sqlx::query(
            "INSERT INTO security_roles (role_name) VALUES ($1)
             ON CONFLICT (role_name) DO NOTHING",
        )
        .bind(name)
        .execute(pool)
        .await?;
    }

    for (name, system_type, criticality) in AFFECTED_SYSTEMS {
        sqlx::query(
            "INSERT INTO affected_systems (system_name, system_type_id, criticality_id)
             SELECT $1, st.system_type_id, cl.criticality_id
             FROM system_types st, criticality_levels cl
             WHERE st.type_name = $2 AND cl.level_name = $3
             ON CONFLICT (system_name) DO NOTHING",
        )
        .bind(name)
        .bind(system_type)
        .bind(criticality)
        .execute(pool)
        .await?;
    }

    for (first, last, email, role) in SECURITY_TEAM {
        sqlx::query(
            "INSERT INTO security_team (first_name, last_name, email, role_id)
             SELECT $1, $2, $3, role_id FROM security_roles WHERE role_name = $4
             ON CONFLICT (email) DO NOTHING",
        )
        .bind(first)
        .bind(last)
        .bind(email)
        .bind(role)
        .execute(pool)
        .await?;
    }

    for (first, last, email, department) in REPORTERS {
        let password_hash = hash_password(DEFAULT_REPORTER_PASSWORD)
            .map_err(|e| DbError::Configuration(e.to_string()))?;
        sqlx::query(
            "INSERT INTO reporters
                (first_name, last_name, email, password_hash, contact_number, department_id)
             SELECT $1, $2, $3, $4, NULL, department_id
             FROM departments WHERE department_name = $5
             ON CONFLICT (email) DO NOTHING",
        )
        .bind(first)
        .bind(last)
        .bind(email)
        .bind(&password_hash)
        .bind(department)
        .execute(pool)
        .await?;
    }

    let guideline_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM threat_guidelines")
        .fetch_one(pool)
        .await?;
    if guideline_count == 0 {
        for (incident_type, category, description, risk) in GUIDELINES {
            sqlx::query(
                "INSERT INTO threat_guidelines
                    (type_id, guideline_category, guideline_description, risk_level)
                 SELECT type_id, $1, $2, $3 FROM incident_types WHERE type_name = $4",
            )
            .bind(category)
            .bind(description)
            .bind(risk)
            .bind(incident_type)
            .execute(pool)
            .await?;
        }
    }

    let incident_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM incidents")
        .fetch_one(pool)
        .await?;
    if incident_count == 0 {
        for (title, itype, severity, system, reporter, status, discovered, reported, desc, impact) in
            SAMPLE_INCIDENTS
        {
            sqlx::query(
                "INSERT INTO incidents
                    (incident_title, type_id, severity_id, system_id, reporter_id, status_id,
                     discovered_at, reported_at, description, financial_impact,
                     created_at, updated_at)
                 SELECT $1, it.type_id, sl.severity_id, a.system_id, r.reporter_id, st.status_id,
                        $2, $3, $4, $5, $6, $7
                 FROM incident_types it, severity_levels sl, affected_systems a,
                      reporters r, incident_statuses st
                 WHERE it.type_name = $8 AND sl.severity_name = $9 AND a.system_name = $10
                   AND r.email = $11 AND st.status_name = $12",
            )
            .bind(title)
            .bind(fixture_time(discovered))
            .bind(fixture_time(reported))
            .bind(desc)
            .bind(impact)
            .bind(Utc::now())
            .bind(Utc::now())
            .bind(itype)
            .bind(severity)
            .bind(system)
            .bind(reporter)
            .bind(status)
            .execute(pool)
            .await?;
        }
    }

    info!("Database seeding completed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_timestamps_parse() {
        for (_, _, _, _, _, _, discovered, reported, _, _) in SAMPLE_INCIDENTS {
            let d = fixture_time(discovered);
            let r = fixture_time(reported);
            assert!(r >= d);
        }
    }

    #[test]
    fn test_guidelines_reference_seeded_types() {
        let type_names: Vec<&str> = INCIDENT_TYPES.iter().map(|(name, _)| *name).collect();
        for (incident_type, category, _, _) in GUIDELINES {
            assert!(type_names.contains(incident_type));
            assert!(*category == "DO" || *category == "DONT");
        }
    }

    #[test]
    fn test_default_password_meets_strength_rules() {
        assert!(crate::auth::password::validate_password_strength(DEFAULT_REPORTER_PASSWORD)
            .is_empty());
    }
}
