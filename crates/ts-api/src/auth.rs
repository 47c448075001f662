//! Axum extractors for session authentication.

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use ts_core::{SessionClaims, SessionError};

use crate::error::ApiError;
use crate::state::AppState;

/// Extractor for requests that must carry a valid session token.
///
/// Expects `Authorization: Bearer <token>`; rejects with 401 when the
/// header is missing, the signature is invalid, or the token has expired.
pub struct AuthenticatedReporter(pub SessionClaims);

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedReporter
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);

        let token = bearer_token(parts)
            .ok_or_else(|| ApiError::Unauthorized("Authentication required".to_string()))?;

        match app_state.session_keys.verify(token) {
            Ok(claims) => Ok(AuthenticatedReporter(claims)),
            Err(SessionError::Expired) => Err(ApiError::SessionExpired),
            Err(_) => Err(ApiError::Unauthorized(
                "Invalid session token".to_string(),
            )),
        }
    }
}

/// Extractor that yields session claims when a valid token is present and
/// `None` otherwise. Never rejects.
pub struct OptionalReporter(pub Option<SessionClaims>);

#[async_trait]
impl<S> FromRequestParts<S> for OptionalReporter
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);

        let claims = bearer_token(parts).and_then(|token| app_state.session_keys.verify(token).ok());

        Ok(OptionalReporter(claims))
    }
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}
