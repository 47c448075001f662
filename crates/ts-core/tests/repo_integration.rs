//! Repository integration tests against in-memory SQLite.

use chrono::Utc;
use std::time::Duration;
use ts_core::db::{
    create_analytics_repository, create_incident_repository, create_lookup_repository,
    create_pool_with_options, create_reporter_repository, create_team_repository, run_migrations,
    seed_database, AnalyticsRepository, DbError, DbPool, IncidentRepository, LookupKind,
    LookupRepository, PoolOptions, ReporterRepository, TeamRepository,
};
use ts_core::{hash_password, verify_password, NewIncident};

/// Single-connection pool so the in-memory database is shared by every
/// query in the test.
async fn test_pool() -> DbPool {
    let options = PoolOptions {
        max_connections: 1,
        min_connections: 1,
        acquire_timeout: Duration::from_secs(5),
        max_lifetime: None,
        idle_timeout: None,
    };
    let pool = create_pool_with_options("sqlite::memory:", options)
        .await
        .unwrap();
    run_migrations(&pool).await.unwrap();
    seed_database(&pool).await.unwrap();
    pool
}

async fn build_incident(pool: &DbPool, type_name: &str, severity: &str, system: &str) -> NewIncident {
    let lookups = create_lookup_repository(pool);
    let now = Utc::now();

    NewIncident {
        title: format!("Test {} Incident", type_name),
        type_id: lookups
            .id_by_name(LookupKind::IncidentType, type_name)
            .await
            .unwrap(),
        severity_id: lookups
            .id_by_name(LookupKind::SeverityLevel, severity)
            .await
            .unwrap(),
        system_id: lookups
            .id_by_name(LookupKind::AffectedSystem, system)
            .await
            .unwrap(),
        reporter_id: 1,
        status_id: lookups
            .id_by_name(LookupKind::IncidentStatus, "Open")
            .await
            .unwrap(),
        assigned_to: None,
        discovered_at: now,
        reported_at: now,
        description: "test".to_string(),
        financial_impact: None,
        initial_response: None,
    }
}

#[tokio::test]
async fn test_created_incident_resolves_names_on_read() {
    let pool = test_pool().await;
    let incidents = create_incident_repository(&pool);

    let incident = build_incident(&pool, "Phishing", "Medium", "Email Server").await;
    let incident_id = incidents.create(&incident).await.unwrap();

    let listed = incidents.list().await.unwrap();
    let created = listed
        .iter()
        .find(|i| i.incident_id == incident_id)
        .expect("created incident is listed");

    assert_eq!(created.incident_type, "Phishing");
    assert_eq!(created.severity, "Medium");
    assert_eq!(created.affected_system, "Email Server");
    assert_eq!(created.department, "IT");
    assert_eq!(created.status, "Open");
}

#[tokio::test]
async fn test_lookup_miss_is_an_error_not_a_null_fk() {
    let pool = test_pool().await;
    let lookups = create_lookup_repository(&pool);

    let result = lookups
        .id_by_name(LookupKind::IncidentType, "Cryptojacking")
        .await;

    match result {
        Err(DbError::NotFound { entity, id }) => {
            assert_eq!(entity, "incident type");
            assert_eq!(id, "Cryptojacking");
        }
        other => panic!("expected NotFound, got {:?}", other.map(|_| ())),
    }
}

#[tokio::test]
async fn test_create_with_initial_response_writes_log_rows() {
    let pool = test_pool().await;
    let incidents = create_incident_repository(&pool);

    let mut incident = build_incident(&pool, "Malware", "High", "File Server").await;
    incident.initial_response = Some("Pulled the network cable".to_string());
    let incident_id = incidents.create(&incident).await.unwrap();

    if let DbPool::Sqlite(p) = &pool {
        let log_count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM incident_logs WHERE incident_id = ?")
                .bind(incident_id)
                .fetch_one(p)
                .await
                .unwrap();
        assert_eq!(log_count, 2);
    }
}

#[tokio::test]
async fn test_assign_moves_status_and_logs() {
    let pool = test_pool().await;
    let incidents = create_incident_repository(&pool);
    let lookups = create_lookup_repository(&pool);
    let team = create_team_repository(&pool);

    let incident = build_incident(&pool, "DDoS", "High", "Web Application").await;
    let incident_id = incidents.create(&incident).await.unwrap();

    let member = team.first_available().await.unwrap().unwrap();
    let status_id = lookups
        .id_by_name(LookupKind::IncidentStatus, "Investigation")
        .await
        .unwrap();

    incidents
        .assign(incident_id, member.member_id, status_id)
        .await
        .unwrap();

    let detail = incidents.get_detail(incident_id).await.unwrap().unwrap();
    assert_eq!(detail.status, "Investigation");
    assert_eq!(
        detail.assigned_to.as_deref(),
        Some(format!("{} {}", member.first_name, member.last_name).as_str())
    );
}

#[tokio::test]
async fn test_assign_unknown_incident_is_not_found() {
    let pool = test_pool().await;
    let incidents = create_incident_repository(&pool);

    let result = incidents.assign(99_999, 1, 1).await;
    assert!(matches!(result, Err(DbError::NotFound { .. })));
}

#[tokio::test]
async fn test_severity_distribution_sums_to_total() {
    let pool = test_pool().await;
    let incidents = create_incident_repository(&pool);
    let analytics = create_analytics_repository(&pool);

    // Add a few more incidents across severities.
    for (severity, system) in [("Medium", "Email Server"), ("Medium", "File Server"), ("Low", "Employee Portal")] {
        let incident = build_incident(&pool, "Phishing", severity, system).await;
        incidents.create(&incident).await.unwrap();
    }

    let total = analytics.total_incidents().await.unwrap();
    let distribution = analytics.severity_distribution().await.unwrap();

    let sum: i64 = distribution.iter().map(|s| s.count).sum();
    assert_eq!(sum as u64, total);

    // One row per distinct severity present.
    let mut names: Vec<&str> = distribution.iter().map(|s| s.name.as_str()).collect();
    names.dedup();
    assert_eq!(names.len(), distribution.len());
}

#[tokio::test]
async fn test_monthly_incidents_returns_six_zero_filled_buckets() {
    let pool = test_pool().await;
    let incidents = create_incident_repository(&pool);
    let analytics = create_analytics_repository(&pool);

    // One incident discovered right now lands in the newest bucket; the
    // seeded 2024 incidents are outside the window.
    let incident = build_incident(&pool, "Ransomware", "Critical", "File Server").await;
    incidents.create(&incident).await.unwrap();

    let trend = analytics.monthly_incidents().await.unwrap();
    assert_eq!(trend.len(), 6);
    assert!(trend[5].incidents >= 1);

    let labels = ["Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec"];
    for bucket in &trend {
        assert!(labels.contains(&bucket.month.as_str()));
        assert!(bucket.incidents >= 0);
    }
}

#[tokio::test]
async fn test_recent_respects_limit_and_order() {
    let pool = test_pool().await;
    let incidents = create_incident_repository(&pool);

    for _ in 0..4 {
        let incident = build_incident(&pool, "Phishing", "Low", "Email Server").await;
        incidents.create(&incident).await.unwrap();
    }

    let recent = incidents.recent(3).await.unwrap();
    assert_eq!(recent.len(), 3);
}

#[tokio::test]
async fn test_password_update_round_trip() {
    let pool = test_pool().await;
    let reporters = create_reporter_repository(&pool);

    let email = "alice.b@company.com";
    let reporter = reporters.get_by_email(email).await.unwrap().unwrap();

    // Seeded password verifies against the stored hash.
    assert!(verify_password(
        ts_core::db::seed::DEFAULT_REPORTER_PASSWORD,
        &reporter.password_hash
    )
    .unwrap());

    // Store a new hash, then the old password no longer verifies.
    let new_hash = hash_password("Fresher456").unwrap();
    reporters.update_password(email, &new_hash).await.unwrap();

    let updated = reporters.get_by_email(email).await.unwrap().unwrap();
    assert!(verify_password("Fresher456", &updated.password_hash).unwrap());
    assert!(!verify_password(
        ts_core::db::seed::DEFAULT_REPORTER_PASSWORD,
        &updated.password_hash
    )
    .unwrap());
}

#[tokio::test]
async fn test_password_update_for_unknown_email_is_not_found() {
    let pool = test_pool().await;
    let reporters = create_reporter_repository(&pool);

    let hash = hash_password("Whatever789").unwrap();
    let result = reporters.update_password("nobody@company.com", &hash).await;
    assert!(matches!(result, Err(DbError::NotFound { .. })));
}

#[tokio::test]
async fn test_contact_number_update() {
    let pool = test_pool().await;
    let reporters = create_reporter_repository(&pool);

    reporters
        .update_contact_number("carol.d@company.com", "+15550142")
        .await
        .unwrap();

    let carol = reporters
        .get_by_email("carol.d@company.com")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(carol.contact_number.as_deref(), Some("+15550142"));
}

#[tokio::test]
async fn test_guidelines_grouped_by_category() {
    let pool = test_pool().await;
    let lookups = create_lookup_repository(&pool);
    let team = create_team_repository(&pool);

    let type_id = lookups
        .id_by_name(LookupKind::IncidentType, "Ransomware")
        .await
        .unwrap();
    let guidelines = team.guidelines_for_type(type_id).await.unwrap();

    assert!(!guidelines.do_items.is_empty());
    assert!(!guidelines.dont_items.is_empty());

    // Ordered by risk level, CRITICAL first.
    assert_eq!(guidelines.do_items[0].risk_level, "CRITICAL");
}

#[tokio::test]
async fn test_seeding_twice_is_idempotent() {
    let pool = test_pool().await;
    let analytics = create_analytics_repository(&pool);

    let before = analytics.total_incidents().await.unwrap();
    let departments_before = analytics.total_departments().await.unwrap();

    seed_database(&pool).await.unwrap();

    assert_eq!(analytics.total_incidents().await.unwrap(), before);
    assert_eq!(
        analytics.total_departments().await.unwrap(),
        departments_before
    );
}

#[tokio::test]
async fn test_lookup_lists_are_populated() {
    let pool = test_pool().await;
    let lookups = create_lookup_repository(&pool);

    let types = lookups.list(LookupKind::IncidentType).await.unwrap();
    assert!(types.iter().any(|t| t.name == "Phishing"));
    assert!(types.iter().all(|t| t.description.is_some()));

    let departments = lookups.list(LookupKind::Department).await.unwrap();
    assert_eq!(departments.len(), 3);
    assert!(departments.iter().all(|d| d.description.is_none()));
}
