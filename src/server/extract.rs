//! Request extractors shared by the route handlers

use std::convert::Infallible;

use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Request},
    http::request::Parts,
    response::{IntoResponse, Response},
    Json,
};
use serde::de::DeserializeOwned;

use super::error::ApiError;
use super::responder::{unauthorized, AUTHENTICATION_REQUIRED};
use crate::auth::{AuthenticatedUser, SecurityContext};
use crate::models::Validate;

/// JSON body that has passed its field constraints
///
/// Unparseable bodies and constraint violations are both rejected with a bare
/// 400.
#[derive(Debug)]
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await.map_err(|rejection| {
            tracing::debug!(error = %rejection, "Rejected request body");
            ApiError::BadRequest
        })?;

        value.validate().map_err(|e| {
            tracing::debug!(field = e.field, reason = %e.reason, "Request body failed validation");
            ApiError::BadRequest
        })?;

        Ok(Self(value))
    }
}

/// Parse a numeric path identifier
pub fn parse_id(raw: &str) -> Result<i64, ApiError> {
    raw.parse::<i64>().map_err(|_| {
        tracing::debug!(id = raw, "Rejected non-numeric identifier");
        ApiError::BadRequest
    })
}

#[async_trait]
impl<S> FromRequestParts<S> for SecurityContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<SecurityContext>()
            .cloned()
            .unwrap_or_default())
    }
}

/// The authenticated caller of a protected route
#[derive(Debug, Clone)]
pub struct CurrentUser(pub AuthenticatedUser);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<SecurityContext>()
            .and_then(|context| context.principal().cloned())
            .map(CurrentUser)
            .ok_or_else(|| {
                unauthorized(parts.uri.path(), Some(AUTHENTICATION_REQUIRED)).into_response()
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LoginRequest;
    use axum::{http::StatusCode, routing::post, Router};
    use axum_test::TestServer;

    async fn echo_login(ValidatedJson(request): ValidatedJson<LoginRequest>) -> String {
        request.email
    }

    fn create_test_server() -> TestServer {
        let app = Router::new().route("/login", post(echo_login));
        TestServer::new(app).unwrap()
    }

    // Test 1: Valid body passes through
    #[tokio::test]
    async fn test_validated_json_accepts_valid_body() {
        let server = create_test_server();

        let response = server
            .post("/login")
            .json(&serde_json::json!({ "email": "a@b.com", "password": "secret" }))
            .await;

        response.assert_status_ok();
        response.assert_text("a@b.com");
    }

    // Test 2: Blank field is a bare 400
    #[tokio::test]
    async fn test_validated_json_rejects_blank_field() {
        let server = create_test_server();

        let response = server
            .post("/login")
            .json(&serde_json::json!({ "email": "  ", "password": "secret" }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        assert!(response.text().is_empty());
    }

    // Test 3: Missing field is a bare 400
    #[tokio::test]
    async fn test_validated_json_rejects_missing_field() {
        let server = create_test_server();

        let response = server
            .post("/login")
            .json(&serde_json::json!({ "email": "a@b.com" }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        assert!(response.text().is_empty());
    }

    // Test 4: Non-numeric identifiers
    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id("42").unwrap(), 42);
        assert!(matches!(parse_id("abc"), Err(ApiError::BadRequest)));
        assert!(matches!(parse_id(""), Err(ApiError::BadRequest)));
    }
}
