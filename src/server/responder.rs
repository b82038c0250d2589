//! Authentication failure responses
//!
//! Every 401 caused by missing or failed authentication is written here, so
//! the body always has the same shape:
//! `{"status": 401, "error": "Unauthorized", "message": ..., "path": ...}`.

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

/// Message used when a protected route is reached without authentication
pub const AUTHENTICATION_REQUIRED: &str = "Full authentication is required to access this resource";

/// JSON body of an authentication failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnauthorizedBody {
    pub status: u16,
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub path: String,
}

impl UnauthorizedBody {
    pub fn new(path: impl Into<String>, message: Option<String>) -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED.as_u16(),
            error: "Unauthorized".to_string(),
            message,
            path: path.into(),
        }
    }
}

impl IntoResponse for UnauthorizedBody {
    fn into_response(self) -> Response {
        match serde_json::to_string(&self) {
            Ok(body) => (
                StatusCode::UNAUTHORIZED,
                [(header::CONTENT_TYPE, "application/json")],
                body,
            )
                .into_response(),
            Err(e) => {
                tracing::error!(error = %e, "Failed to serialize unauthorized body");
                StatusCode::UNAUTHORIZED.into_response()
            }
        }
    }
}

/// Build the 401 response for `path`
pub fn unauthorized(path: &str, message: Option<&str>) -> Response {
    UnauthorizedBody::new(path, message.map(str::to_string)).into_response()
}
