//! HTTP router for session-booking
//!
//! Public routes:
//! - `GET /health`
//! - `POST /api/auth/login`, `POST /api/auth/register`
//!
//! Every other route requires a bearer token.

use axum::{
    middleware,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::handlers::{auth, session, teacher, user};
use super::middleware::{
    authentication_gate, logging_middleware, require_authentication, tracing_middleware,
};
use crate::auth::{AuthenticationGate, Authenticator, PrincipalStore, TokenCodec};
use crate::database::Database;
use crate::otel::Metrics;
use crate::services::{AccountService, EnrollmentService, SessionService};

/// Shared application state
pub struct AppState<D: Database> {
    /// Repository
    pub database: Arc<D>,

    /// Bearer token to security context resolution
    pub gate: AuthenticationGate<D>,

    pub accounts: AccountService<D>,

    pub sessions: SessionService<D>,

    pub enrollment: EnrollmentService<D>,

    pub metrics: Arc<Metrics>,
}

impl<D: Database> AppState<D> {
    /// Wire services and the authentication gate around one repository
    pub fn new(
        database: Arc<D>,
        codec: Arc<TokenCodec>,
        authenticator: Arc<dyn Authenticator>,
        metrics: Arc<Metrics>,
    ) -> Self {
        let gate = AuthenticationGate::new(
            Arc::clone(&codec),
            PrincipalStore::new(Arc::clone(&database)),
        );

        Self {
            gate,
            accounts: AccountService::new(Arc::clone(&database), authenticator, codec),
            sessions: SessionService::new(Arc::clone(&database)),
            enrollment: EnrollmentService::new(Arc::clone(&database)),
            database,
            metrics,
        }
    }
}

impl<D: Database> Clone for AppState<D> {
    fn clone(&self) -> Self {
        Self {
            database: Arc::clone(&self.database),
            gate: self.gate.clone(),
            accounts: self.accounts.clone(),
            sessions: self.sessions.clone(),
            enrollment: self.enrollment.clone(),
            metrics: Arc::clone(&self.metrics),
        }
    }
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Build the main application router
///
/// Layers run outermost first: tracing span, request logging, authentication
/// gate, then the authorization predicate.
pub fn build_router<D: Database + 'static>(state: AppState<D>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        // Authentication
        .route("/api/auth/login", post(auth::login::<D>))
        .route("/api/auth/register", post(auth::register::<D>))
        // Teachers
        .route("/api/teacher", get(teacher::list_teachers::<D>))
        .route("/api/teacher/:id", get(teacher::get_teacher::<D>))
        // Users
        .route(
            "/api/user/:id",
            get(user::get_user::<D>).delete(user::delete_user::<D>),
        )
        // Sessions
        .route(
            "/api/session",
            get(session::list_sessions::<D>).post(session::create_session::<D>),
        )
        .route(
            "/api/session/:id",
            get(session::get_session::<D>)
                .put(session::update_session::<D>)
                .delete(session::delete_session::<D>),
        )
        .route(
            "/api/session/:id/participate/:user_id",
            post(session::participate::<D>).delete(session::no_longer_participate::<D>),
        )
        .layer(middleware::from_fn_with_state(
            Arc::clone(&state.metrics),
            require_authentication,
        ))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            authentication_gate::<D>,
        ))
        .layer(middleware::from_fn_with_state(
            Arc::clone(&state.metrics),
            logging_middleware,
        ))
        .layer(middleware::from_fn(tracing_middleware))
        .with_state(state)
}

/// Health check handler
async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
