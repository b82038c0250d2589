//! Mapping of service errors to HTTP responses

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};

use crate::error::ServiceError;
use crate::models::MessageResponse;

/// Error returned by route handlers
#[derive(Debug)]
pub enum ApiError {
    /// 400 with an empty body
    BadRequest,

    /// 404 with an empty body
    NotFound,

    /// 401 with an empty body, for ownership mismatches
    Unauthorized,

    /// Status with a `{"message": ...}` body
    Message(StatusCode, String),

    /// 500; the detail is logged, not returned
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest => StatusCode::BAD_REQUEST.into_response(),
            ApiError::NotFound => StatusCode::NOT_FOUND.into_response(),
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
            ApiError::Message(status, message) => {
                (status, Json(MessageResponse::new(message))).into_response()
            }
            ApiError::Internal(detail) => {
                tracing::error!(error = %detail, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(serde_json::json!({ "error": "Internal server error" })),
                )
                    .into_response()
            }
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::NotFound => ApiError::NotFound,
            ServiceError::BadRequest(reason) => {
                tracing::debug!(reason = %reason, "Rejected state transition");
                ApiError::BadRequest
            }
            ServiceError::EmailTaken => {
                ApiError::Message(StatusCode::BAD_REQUEST, ServiceError::EmailTaken.to_string())
            }
            ServiceError::Unauthorized => ApiError::Unauthorized,
            ServiceError::Auth(e) => ApiError::Internal(e.to_string()),
            ServiceError::Database(e) => ApiError::Internal(e.to_string()),
        }
    }
}
