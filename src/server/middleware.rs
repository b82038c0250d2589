//! HTTP middleware for session-booking
//!
//! Composed in `build_router`, outermost first:
//! - request tracing span
//! - request logging
//! - authentication gate, which populates the security context
//! - authorization predicate, which rejects unauthenticated protected calls

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use std::time::Instant;

use super::responder::{unauthorized, AUTHENTICATION_REQUIRED};
use super::router::AppState;
use crate::auth::SecurityContext;
use crate::database::Database;
use crate::otel::Metrics;

/// Paths reachable without authentication, matched exactly
const PUBLIC_PATHS: &[&str] = &["/health"];

/// Path prefixes reachable without authentication
const PUBLIC_PREFIXES: &[&str] = &["/api/auth/"];

fn is_public(path: &str) -> bool {
    PUBLIC_PATHS.contains(&path) || PUBLIC_PREFIXES.iter().any(|p| path.starts_with(p))
}

/// Authentication gate middleware
///
/// Resolves the bearer token into a [`SecurityContext`] and stores it in the
/// request extensions. The request always continues, authenticated or not.
pub async fn authentication_gate<D: Database + 'static>(
    State(state): State<AppState<D>>,
    mut request: Request,
    next: Next,
) -> Response {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    let context = state.gate.authenticate(auth_header).await;
    request.extensions_mut().insert(context);

    next.run(request).await
}

/// Authorization predicate
///
/// Protected routes need a populated security context; anything else is
/// answered by the unauthorized responder.
pub async fn require_authentication(
    State(metrics): State<Arc<Metrics>>,
    request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path();

    if is_public(path) {
        return next.run(request).await;
    }

    let authenticated = request
        .extensions()
        .get::<SecurityContext>()
        .is_some_and(SecurityContext::is_authenticated);

    if !authenticated {
        metrics.record_auth_rejection();
        tracing::debug!(path = %path, "Rejected unauthenticated request");
        return unauthorized(path, Some(AUTHENTICATION_REQUIRED));
    }

    next.run(request).await
}

/// Logging middleware function
///
/// Logs method, path, status and response time, and records the duration
/// histogram.
pub async fn logging_middleware(
    State(metrics): State<Arc<Metrics>>,
    request: Request,
    next: Next,
) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let uri = request.uri().clone();

    let response = next.run(request).await;

    let elapsed = start.elapsed();
    let status = response.status();

    metrics.record_request_duration(method.as_str(), status.as_u16(), elapsed.as_secs_f64());

    tracing::info!(
        method = %method,
        path = %uri.path(),
        status = %status.as_u16(),
        duration_ms = %elapsed.as_millis(),
        "Request completed"
    );

    response
}

/// Tracing middleware function
///
/// Wraps the whole request in an `http_request` span. The query string is
/// left out of the span.
pub async fn tracing_middleware(request: Request, next: Next) -> Response {
    use tracing::Instrument;

    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let span = tracing::info_span!(
        "http_request",
        http.method = %method,
        http.route = %path,
        http.status_code = tracing::field::Empty,
    );

    async move {
        let response = next.run(request).await;
        tracing::Span::current().record("http.status_code", response.status().as_u16());
        response
    }
    .instrument(span)
    .await
}
