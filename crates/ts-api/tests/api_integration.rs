//! End-to-end API tests against in-memory SQLite.

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use regex::Regex;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

use ts_api::{ApiServer, AppState};
use ts_core::db::{
    create_pool_with_options, run_migrations, seed_database, PoolOptions,
};
use ts_core::{NlqError, QueryTranslator, SessionKeys};

/// Canned translator: echoes a fixed SELECT, or a destructive statement
/// when the question asks for one (to exercise the guard).
struct StubTranslator;

#[axum::async_trait]
impl QueryTranslator for StubTranslator {
    async fn translate(&self, question: &str) -> Result<String, NlqError> {
        if question.contains("destroy") {
            Ok("DROP TABLE incidents".to_string())
        } else {
            Ok("SELECT incident_title FROM incidents ORDER BY incident_id".to_string())
        }
    }
}

async fn test_app() -> Router {
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

    let state = AppState::new(pool, Arc::new(StubTranslator), SessionKeys::generate());
    ApiServer::with_state(state).router()
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
    token: Option<&str>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);

    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }

    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };

    (status, value)
}

async fn login(app: &Router, email: &str, password: &str) -> (StatusCode, Value) {
    send(
        app,
        Method::POST,
        "/api/login",
        Some(json!({ "email": email, "password": password })),
        None,
    )
    .await
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = test_app().await;

    let (status, body) = send(&app, Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"]["db_type"], "sqlite");
}

#[tokio::test]
async fn test_login_success_and_failure() {
    let app = test_app().await;

    let (status, body) = login(
        &app,
        "alice.b@company.com",
        ts_core::db::seed::DEFAULT_REPORTER_PASSWORD,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert!(body["token"].as_str().unwrap().contains('.'));
    assert_eq!(body["user"]["email"], "alice.b@company.com");
    assert!(body["user"].get("password_hash").is_none());

    let (status, body) = login(&app, "alice.b@company.com", "WrongPassword1").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "INVALID_CREDENTIALS");

    let (status, _) = login(&app, "nobody@company.com", "WrongPassword1").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_incident_submission_end_to_end() {
    let app = test_app().await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/incidents",
        Some(json!({
            "incident_type": "Phishing",
            "severity": "Medium",
            "affected_system": "Email Server",
            "department": "IT",
            "description": "test"
        })),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);

    let title = body["incident_title"].as_str().unwrap();
    let pattern = Regex::new(r"^\w+ \w+ #PHISHING_\d{4}$").unwrap();
    assert!(pattern.is_match(title), "unexpected title: {}", title);

    // The security team got assigned and guidelines came back.
    assert!(body["assigned_to"].as_str().is_some());
    assert!(!body["guidelines"]["DO"].as_array().unwrap().is_empty());

    // The new incident shows up in the list with resolved names.
    let (status, list) = send(&app, Method::GET, "/api/incidents", None, None).await;
    assert_eq!(status, StatusCode::OK);

    let created = list
        .as_array()
        .unwrap()
        .iter()
        .find(|i| i["incident_title"] == title)
        .expect("created incident is listed");
    assert_eq!(created["incident_type"], "Phishing");
    assert_eq!(created["severity"], "Medium");
    assert_eq!(created["affected_system"], "Email Server");
    assert_eq!(created["department"], "IT");
    assert_eq!(created["status"], "Investigation");
}

#[tokio::test]
async fn test_unknown_lookup_name_is_rejected() {
    let app = test_app().await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/incidents",
        Some(json!({
            "incident_type": "Cryptojacking",
            "severity": "Medium",
            "affected_system": "Email Server",
            "department": "IT",
            "description": "test"
        })),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"]
        .as_str()
        .unwrap()
        .contains("Cryptojacking"));
}

#[tokio::test]
async fn test_assignment_endpoint() {
    let app = test_app().await;

    // Seeded incident 1 exists.
    let (status, body) = send(
        &app,
        Method::PUT,
        "/api/incidents/1/assign",
        Some(json!({ "member_id": 2, "status": "In Progress" })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["member_id"], 2);

    let (status, body) = send(
        &app,
        Method::PUT,
        "/api/incidents/1/assign",
        Some(json!({ "member_id": 2, "status": "Daydreaming" })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("Invalid status"));

    let (status, _) = send(
        &app,
        Method::PUT,
        "/api/incidents/99999/assign",
        Some(json!({ "member_id": 2 })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_lookup_endpoints() {
    let app = test_app().await;

    let (status, body) = send(&app, Method::GET, "/api/incident-types", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body
        .as_array()
        .unwrap()
        .iter()
        .any(|t| t["name"] == "Phishing"));

    let (status, body) = send(&app, Method::GET, "/api/security-team", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let members = body.as_array().unwrap();
    assert_eq!(members.len(), 3);
    assert!(members[0]["role_name"].as_str().is_some());
}

#[tokio::test]
async fn test_threat_guidelines_grouped() {
    let app = test_app().await;

    let (status, body) = send(&app, Method::GET, "/api/threat-guidelines/1", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["DO"].is_array());
    assert!(body["DONT"].is_array());
    assert!(!body["DO"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_generate_query_translates_and_executes() {
    let app = test_app().await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/generate-query",
        Some(json!({ "query": "list all incident titles" })),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["sql_query"],
        "SELECT incident_title FROM incidents ORDER BY incident_id"
    );
    assert_eq!(body["columns"][0], "incident_title");
    assert_eq!(body["rows"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_generate_query_guard_rejects_destructive_sql() {
    let app = test_app().await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/generate-query",
        Some(json!({ "query": "please destroy everything" })),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("rejected"));

    // Nothing was dropped.
    let (status, list) = send(&app, Method::GET, "/api/incidents", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_execute_query_is_select_only() {
    let app = test_app().await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/execute-query",
        Some(json!({ "query": "SELECT severity_name FROM severity_levels ORDER BY severity_id" })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["rows"].as_array().unwrap().len(), 4);

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/execute-query",
        Some(json!({ "query": "DELETE FROM incidents" })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_generate_insert_query_renders_template() {
    let app = test_app().await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/generate-insert-query",
        Some(json!({
            "incident_type": "Phishing",
            "severity": "Medium",
            "affected_system": "Email Server",
            "description": "suspicious email"
        })),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let sql = body["sql_query"].as_str().unwrap();
    assert!(sql.starts_with("INSERT INTO incidents"));
    assert!(sql.contains("suspicious email"));
    assert!(sql.contains("#PHISHING_"));
}

#[tokio::test]
async fn test_password_change_flow() {
    let app = test_app().await;

    let (_, body) = login(
        &app,
        "bob.w@company.com",
        ts_core::db::seed::DEFAULT_REPORTER_PASSWORD,
    )
    .await;
    let token = body["token"].as_str().unwrap().to_string();

    // Without a token the endpoint is unauthorized.
    let (status, _) = send(
        &app,
        Method::PUT,
        "/api/settings/password",
        Some(json!({ "current_password": "x", "new_password": "y" })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Wrong current password.
    let (status, body) = send(
        &app,
        Method::PUT,
        "/api/settings/password",
        Some(json!({
            "current_password": "NotTheRightOne1",
            "new_password": "BrandNewPass1"
        })),
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"]
        .as_str()
        .unwrap()
        .contains("Current password is incorrect"));

    // Weak replacement password.
    let (status, _) = send(
        &app,
        Method::PUT,
        "/api/settings/password",
        Some(json!({
            "current_password": ts_core::db::seed::DEFAULT_REPORTER_PASSWORD,
            "new_password": "weak"
        })),
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    // Successful change, then login with the new password.
    let (status, body) = send(
        &app,
        Method::PUT,
        "/api/settings/password",
        Some(json!({
            "current_password": ts_core::db::seed::DEFAULT_REPORTER_PASSWORD,
            "new_password": "BrandNewPass1"
        })),
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Password updated successfully");

    let (status, _) = login(&app, "bob.w@company.com", "BrandNewPass1").await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = login(
        &app,
        "bob.w@company.com",
        ts_core::db::seed::DEFAULT_REPORTER_PASSWORD,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_phone_update_validation() {
    let app = test_app().await;

    let (_, body) = login(
        &app,
        "carol.d@company.com",
        ts_core::db::seed::DEFAULT_REPORTER_PASSWORD,
    )
    .await;
    let token = body["token"].as_str().unwrap().to_string();

    let (status, _) = send(
        &app,
        Method::PUT,
        "/api/settings/phone",
        Some(json!({ "contact_number": "definitely not a number" })),
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        Method::PUT,
        "/api/settings/phone",
        Some(json!({ "contact_number": "+15550142" })),
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
}

#[tokio::test]
async fn test_report_endpoint() {
    let app = test_app().await;

    let (status, body) = send(&app, Method::GET, "/api/generate-report/1", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["report_title"], "Cybersecurity Incident Report #1");
    assert_eq!(body["incident"]["incident_type"], "Ransomware");
    assert!(body["guidelines"]["DO"].is_array());

    let (status, _) = send(&app, Method::GET, "/api/generate-report/99999", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_analytics_endpoints() {
    let app = test_app().await;

    let (status, body) = send(&app, Method::GET, "/api/analytics/summary", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_incidents"], 2);
    assert_eq!(body["total_departments"], 3);
    assert!(body["most_common_type"].is_object());

    let (status, body) = send(
        &app,
        Method::GET,
        "/api/analytics/severity-distribution",
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let slices = body.as_array().unwrap();
    let sum: i64 = slices.iter().map(|s| s["value"].as_i64().unwrap()).sum();
    assert_eq!(sum, 2);
    assert!(slices.iter().all(|s| s["color"].as_str().is_some()));

    let (status, body) = send(&app, Method::GET, "/api/analytics/monthly", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 6);
}
