//! API server implementation.

use axum::{middleware, Router};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::dto::*;
use crate::error::ErrorResponse;
use crate::middleware::{cors_layer, request_id, request_logging, security_headers};
use crate::routes;
use crate::routes::health::{DatabaseHealth, HealthResponse};
use crate::state::AppState;

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiServerConfig {
    /// Address to bind to.
    pub bind_address: SocketAddr,
    /// Request timeout.
    pub request_timeout: Duration,
    /// Enable Swagger UI.
    pub enable_swagger: bool,
}

impl Default for ApiServerConfig {
    fn default() -> Self {
        Self {
            bind_address: SocketAddr::from(([0, 0, 0, 0], 8080)),
            request_timeout: Duration::from_secs(30),
            enable_swagger: true,
        }
    }
}

/// OpenAPI documentation.
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health::health_check,
        crate::routes::health::readiness_check,
        crate::routes::health::liveness_check,
        crate::routes::incidents::list_incidents,
        crate::routes::incidents::create_incident,
        crate::routes::incidents::assign_incident,
        crate::routes::analytics::summary,
        crate::routes::reports::generate_report,
    ),
    components(
        schemas(
            HealthResponse,
            DatabaseHealth,
            IncidentResponse,
            CreateIncidentRequest,
            CreateIncidentResponse,
            AssignRequest,
            AssignResponse,
            GuidelineResponse,
            GuidelinesResponse,
            LookupResponse,
            TeamMemberResponse,
            LoginRequest,
            LoginResponse,
            ReporterProfile,
            StatusResponse,
            NlQueryRequest,
            NlQueryResponse,
            GenerateInsertRequest,
            GenerateInsertResponse,
            ExecuteQueryRequest,
            ExecuteQueryResponse,
            UpdatePasswordRequest,
            UpdatePhoneRequest,
            AnalyticsSummaryResponse,
            SeveritySliceResponse,
            TypeSliceResponse,
            MonthlyCountResponse,
            IncidentReportDetail,
            IncidentReportResponse,
            ErrorResponse,
        )
    ),
    tags(
        (name = "Health", description = "Health check endpoints"),
        (name = "Incidents", description = "Incident reporting and assignment"),
        (name = "Analytics", description = "Dashboard aggregates"),
        (name = "Reports", description = "Structured incident reports"),
    ),
    info(
        title = "Threat Sentinel API",
        version = "0.1.0",
        description = "Cybersecurity incident tracking with NL-to-SQL querying",
        license(name = "MIT"),
    )
)]
pub struct ApiDoc;

/// API server.
pub struct ApiServer {
    config: ApiServerConfig,
    state: AppState,
}

impl ApiServer {
    /// Creates a new API server.
    pub fn new(state: AppState, config: ApiServerConfig) -> Self {
        Self { config, state }
    }

    /// Creates a new API server with default configuration.
    pub fn with_state(state: AppState) -> Self {
        Self::new(state, ApiServerConfig::default())
    }

    /// Builds the router with all middleware applied.
    pub fn router(&self) -> Router {
        let mut app = routes::create_router(self.state.clone());

        if self.config.enable_swagger {
            app = app.merge(
                SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()),
            );
        }

        app.layer(middleware::from_fn(security_headers))
            .layer(middleware::from_fn(request_logging))
            .layer(middleware::from_fn(request_id))
            .layer(TraceLayer::new_for_http())
            .layer(TimeoutLayer::new(self.config.request_timeout))
            .layer(cors_layer())
            .layer(CatchPanicLayer::new())
    }

    /// Runs the server until SIGINT/SIGTERM.
    pub async fn run(self) -> Result<(), std::io::Error> {
        let addr = self.config.bind_address;
        let app = self.router();

        info!("Starting API server on {}", addr);

        let listener = TcpListener::bind(addr).await?;

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("API server shut down gracefully");
        Ok(())
    }
}

/// Default shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use ts_core::db::create_pool;
    use ts_core::{NlqError, QueryTranslator, SessionKeys};

    struct StubTranslator;

    #[axum::async_trait]
    impl QueryTranslator for StubTranslator {
        async fn translate(&self, _question: &str) -> Result<String, NlqError> {
            Ok("SELECT COUNT(*) FROM incidents".to_string())
        }
    }

    #[tokio::test]
    async fn test_router_builds() {
        let pool = create_pool("sqlite::memory:").await.unwrap();
        let state = AppState::new(pool, Arc::new(StubTranslator), SessionKeys::generate());

        let server = ApiServer::with_state(state);
        let _router = server.router();
    }
}
