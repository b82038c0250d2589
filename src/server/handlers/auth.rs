//! Login and registration

use axum::{
    extract::State,
    http::Uri,
    response::{IntoResponse, Json, Response},
};

use crate::database::Database;
use crate::error::{AuthError, ServiceError};
use crate::models::{JwtResponse, LoginRequest, MessageResponse, SignupRequest};
use crate::server::error::ApiError;
use crate::server::extract::ValidatedJson;
use crate::server::responder::unauthorized;
use crate::server::router::AppState;

/// `POST /api/auth/login`
///
/// Bad credentials are answered by the unauthorized responder so the body
/// matches every other authentication failure.
pub async fn login<D: Database + 'static>(
    State(state): State<AppState<D>>,
    uri: Uri,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> Result<Json<JwtResponse>, Response> {
    match state.accounts.login(&request).await {
        Ok(response) => {
            state.metrics.record_login("success");
            Ok(Json(response))
        }
        Err(ServiceError::Auth(err @ AuthError::BadCredentials)) => {
            state.metrics.record_login("bad_credentials");
            tracing::info!(path = %uri.path(), "Login rejected");
            Err(unauthorized(uri.path(), Some(&err.to_string())))
        }
        Err(e) => {
            state.metrics.record_login("error");
            Err(ApiError::from(e).into_response())
        }
    }
}

/// `POST /api/auth/register`
pub async fn register<D: Database + 'static>(
    State(state): State<AppState<D>>,
    ValidatedJson(request): ValidatedJson<SignupRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    match state.accounts.register(&request).await {
        Ok(_) => {
            state.metrics.record_registration("created");
            Ok(Json(MessageResponse::new("User registered successfully!")))
        }
        Err(ServiceError::EmailTaken) => {
            state.metrics.record_registration("email_taken");
            Err(ServiceError::EmailTaken.into())
        }
        Err(e) => {
            state.metrics.record_registration("error");
            Err(e.into())
        }
    }
}
