//! Common test utilities and helpers for integration tests

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use session_booking::auth::{hash_password, CredentialsAuthenticator, PrincipalStore, TokenCodec};
use session_booking::database::{Database, SqliteDatabase};
use session_booking::models::{Teacher, User};
use session_booking::otel::Metrics;
use session_booking::server::AppState;

pub const TEST_SECRET: &str = "integration-test-secret";
pub const TEST_PASSWORD: &str = "test!1234";

/// Create an in-memory database for testing
pub async fn create_test_database() -> Arc<SqliteDatabase> {
    Arc::new(
        SqliteDatabase::in_memory()
            .await
            .expect("Failed to create test database"),
    )
}

/// Token codec sharing the test server's secret
pub fn create_test_codec() -> TokenCodec {
    TokenCodec::new(TEST_SECRET, Duration::from_secs(3600))
}

/// Store a user whose password is [`TEST_PASSWORD`]
pub async fn seed_user<D: Database>(db: &D, email: &str, admin: bool) -> User {
    let hash = hash_password(TEST_PASSWORD).expect("Failed to hash password");
    db.save_user(&User::new(email, "Doe", "John", hash, admin))
        .await
        .expect("Failed to seed user")
}

pub async fn seed_teacher<D: Database>(db: &D, last_name: &str, first_name: &str) -> Teacher {
    db.save_teacher(&Teacher::new(last_name, first_name))
        .await
        .expect("Failed to seed teacher")
}

/// Create a test application state around `database`
pub fn create_test_state(database: Arc<SqliteDatabase>) -> AppState<SqliteDatabase> {
    let authenticator = Arc::new(CredentialsAuthenticator::new(PrincipalStore::new(
        Arc::clone(&database),
    )));
    AppState::new(
        database,
        Arc::new(create_test_codec()),
        authenticator,
        Arc::new(Metrics::noop()),
    )
}

/// Run a test server in the background and return the address
/// The server will be shut down when the returned shutdown sender is dropped or sent
pub async fn run_test_server(
    state: AppState<SqliteDatabase>,
) -> (std::net::SocketAddr, tokio::sync::oneshot::Sender<()>) {
    use tokio::net::TcpListener;

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test server");
    let addr = listener.local_addr().expect("Failed to get local address");

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();

    let app = session_booking::server::build_router(state)
        .layer(tower_http::trace::TraceLayer::new_for_http());

    tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.await;
            })
            .await
            .expect("Server error");
    });

    tokio::time::sleep(std::time::Duration::from_millis(100)).await;

    (addr, shutdown_tx)
}

/// Log in through the API and return the bearer token
pub async fn login(client: &reqwest::Client, addr: std::net::SocketAddr, email: &str) -> String {
    let body: serde_json::Value = client
        .post(format!("http://{}/api/auth/login", addr))
        .json(&serde_json::json!({ "email": email, "password": TEST_PASSWORD }))
        .send()
        .await
        .expect("Login request failed")
        .json()
        .await
        .expect("Login response was not JSON");

    body["token"]
        .as_str()
        .expect("Login response has no token")
        .to_string()
}
