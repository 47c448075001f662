//! Login and logout endpoints.

use axum::{extract::State, routing::post, Json, Router};
use chrono::Duration;
use tracing::{info, warn};
use validator::Validate;

use crate::dto::{LoginRequest, LoginResponse, StatusResponse};
use crate::error::ApiError;
use crate::state::AppState;
use ts_core::db::{create_reporter_repository, ReporterRepository};
use ts_core::{verify_password, SessionClaims};

/// Session lifetime issued at login.
const SESSION_TTL_HOURS: i64 = 8;

/// Creates the auth routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/logout", post(logout))
}

/// Verifies credentials and issues a signed session token.
async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    request.validate()?;

    let repo = create_reporter_repository(&state.db);

    let reporter = match repo.get_by_email(&request.email).await? {
        Some(reporter) => reporter,
        None => {
            warn!(email = %request.email, "Login attempt for unknown email");
            return Err(ApiError::InvalidCredentials);
        }
    };

    match verify_password(&request.password, &reporter.password_hash) {
        Ok(true) => {}
        Ok(false) => {
            warn!(email = %request.email, "Invalid password");
            return Err(ApiError::InvalidCredentials);
        }
        Err(e) => {
            warn!(email = %request.email, error = %e, "Password verification error");
            return Err(ApiError::Internal(
                "Password verification failed".to_string(),
            ));
        }
    }

    let claims = SessionClaims::new(
        reporter.reporter_id,
        reporter.email.clone(),
        Duration::hours(SESSION_TTL_HOURS),
    );
    let token = state.session_keys.issue(&claims);

    info!(email = %reporter.email, "Reporter logged in");

    Ok(Json(LoginResponse {
        success: true,
        token,
        expires_at: claims.expires_at,
        user: reporter.into(),
    }))
}

/// Logout acknowledgement.
///
/// Tokens are stateless and expire on their own; the client discards its
/// copy.
async fn logout() -> Json<StatusResponse> {
    Json(StatusResponse {
        success: true,
        message: "Logged out".to_string(),
    })
}
