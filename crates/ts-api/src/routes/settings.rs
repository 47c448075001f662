//! Account settings endpoints. All routes require a session token.

use axum::{extract::State, routing::put, Json, Router};
use tracing::info;
use validator::Validate;

use crate::auth::AuthenticatedReporter;
use crate::dto::{StatusResponse, UpdatePasswordRequest, UpdatePhoneRequest};
use crate::error::ApiError;
use crate::state::AppState;
use ts_core::db::{create_reporter_repository, ReporterRepository};
use ts_core::validation::validate_contact_number;
use ts_core::{hash_password, validate_password_strength, verify_password};

/// Creates settings routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/password", put(update_password))
        .route("/phone", put(update_phone))
}

/// Change the logged-in reporter's password.
///
/// The current password is verified against the stored hash before the new
/// one is accepted.
async fn update_password(
    State(state): State<AppState>,
    AuthenticatedReporter(claims): AuthenticatedReporter,
    Json(request): Json<UpdatePasswordRequest>,
) -> Result<Json<StatusResponse>, ApiError> {
    request.validate()?;

    let repo = create_reporter_repository(&state.db);

    let reporter = repo
        .get_by_email(&claims.email)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Reporter '{}' not found", claims.email)))?;

    match verify_password(&request.current_password, &reporter.password_hash) {
        Ok(true) => {}
        Ok(false) => {
            return Err(ApiError::BadRequest(
                "Current password is incorrect".to_string(),
            ));
        }
        Err(e) => return Err(e.into()),
    }

    let strength_errors = validate_password_strength(&request.new_password);
    if !strength_errors.is_empty() {
        return Err(ApiError::UnprocessableEntity(strength_errors.join("; ")));
    }

    let new_hash = hash_password(&request.new_password)?;
    repo.update_password(&claims.email, &new_hash).await?;

    info!(email = %claims.email, "Password updated");

    Ok(Json(StatusResponse {
        success: true,
        message: "Password updated successfully".to_string(),
    }))
}

/// Change the logged-in reporter's contact number.
async fn update_phone(
    State(state): State<AppState>,
    AuthenticatedReporter(claims): AuthenticatedReporter,
    Json(request): Json<UpdatePhoneRequest>,
) -> Result<Json<StatusResponse>, ApiError> {
    request.validate()?;

    if !validate_contact_number(&request.contact_number) {
        return Err(ApiError::BadRequest(
            "Invalid contact number".to_string(),
        ));
    }

    let repo = create_reporter_repository(&state.db);
    repo.update_contact_number(&claims.email, &request.contact_number)
        .await?;

    info!(email = %claims.email, "Contact number updated");

    Ok(Json(StatusResponse {
        success: true,
        message: "Phone number updated successfully".to_string(),
    }))
}
