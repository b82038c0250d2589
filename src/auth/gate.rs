//! Per-request authentication gate
//!
//! The gate reads the `Authorization` header, verifies the bearer token and
//! resolves its subject. It only decides what goes into the request's
//! [`SecurityContext`]; it never rejects a request. Rejection of
//! unauthenticated calls to protected routes happens afterwards, in the
//! authorization layer.

use std::sync::Arc;

use crate::database::Database;
use crate::error::VerifyError;

use super::context::SecurityContext;
use super::principal::{AuthenticatedUser, PrincipalStore, ResolveError};
use super::token::TokenCodec;

/// Exact, case-sensitive scheme prefix
pub const BEARER_PREFIX: &str = "Bearer ";

/// Where the gate stopped for a given request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateOutcome {
    /// No `Authorization` header
    NoHeader,

    /// Header present but not using the `Bearer ` scheme
    UnsupportedScheme,

    /// Token failed verification
    InvalidToken(VerifyError),

    /// Token is valid but its subject no longer resolves
    UnknownSubject,

    /// Principal resolved
    Resolved(AuthenticatedUser),
}

impl GateOutcome {
    /// Security context to publish for this outcome
    pub fn into_context(self) -> SecurityContext {
        match self {
            GateOutcome::Resolved(user) => SecurityContext::authenticated(user),
            _ => SecurityContext::empty(),
        }
    }
}

/// Bearer token authentication
pub struct AuthenticationGate<D: Database> {
    codec: Arc<TokenCodec>,
    principals: PrincipalStore<D>,
}

impl<D: Database> Clone for AuthenticationGate<D> {
    fn clone(&self) -> Self {
        Self {
            codec: Arc::clone(&self.codec),
            principals: self.principals.clone(),
        }
    }
}

impl<D: Database> AuthenticationGate<D> {
    /// Create a gate from a token codec and principal store
    pub fn new(codec: Arc<TokenCodec>, principals: PrincipalStore<D>) -> Self {
        Self { codec, principals }
    }

    /// Evaluate the raw `Authorization` header value
    pub async fn evaluate(&self, header: Option<&str>) -> GateOutcome {
        let header = match header {
            Some(header) => header,
            None => return GateOutcome::NoHeader,
        };

        let token = match header.strip_prefix(BEARER_PREFIX) {
            Some(token) => token,
            None => {
                tracing::debug!("Authorization header does not use the Bearer scheme");
                return GateOutcome::UnsupportedScheme;
            }
        };

        let subject = match self.codec.verify(token) {
            Ok(subject) => subject,
            Err(e) => {
                tracing::debug!(reason = e.kind(), "Bearer token rejected");
                return GateOutcome::InvalidToken(e);
            }
        };

        match self.principals.resolve(&subject).await {
            Ok(principal) => GateOutcome::Resolved(principal.to_authenticated()),
            Err(ResolveError::NotFound(_)) => {
                tracing::debug!("Bearer token subject no longer exists");
                GateOutcome::UnknownSubject
            }
            Err(ResolveError::Repository(e)) => {
                tracing::warn!(error = %e, "Failed to resolve bearer token subject");
                GateOutcome::UnknownSubject
            }
        }
    }

    /// Evaluate the header and build the request's security context
    pub async fn authenticate(&self, header: Option<&str>) -> SecurityContext {
        self.evaluate(header).await.into_context()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MockDatabase;
    use crate::models::User;
    use std::time::Duration;

    const SECRET: &str = "gate-test-secret";

    fn codec() -> Arc<TokenCodec> {
        Arc::new(TokenCodec::new(SECRET, Duration::from_secs(3600)))
    }

    fn create_test_gate(mock_db: MockDatabase) -> AuthenticationGate<MockDatabase> {
        AuthenticationGate::new(codec(), PrincipalStore::new(Arc::new(mock_db)))
    }

    fn bearer(token: &str) -> String {
        format!("Bearer {}", token)
    }

    // Test 1: Missing header never touches the repository
    #[tokio::test]
    async fn test_no_header() {
        let gate = create_test_gate(MockDatabase::new());

        assert_eq!(gate.evaluate(None).await, GateOutcome::NoHeader);
        assert!(!gate.authenticate(None).await.is_authenticated());
    }

    // Test 2: Other schemes and wrong casing are ignored
    #[tokio::test]
    async fn test_unsupported_scheme() {
        let gate = create_test_gate(MockDatabase::new());
        let token = codec().issue("yoga@studio.com").unwrap();

        for header in [
            format!("Basic {}", token),
            format!("bearer {}", token),
            format!("Bearer{}", token),
            token.clone(),
        ] {
            assert_eq!(
                gate.evaluate(Some(&header)).await,
                GateOutcome::UnsupportedScheme,
                "header {:?}",
                header
            );
        }
    }

    // Test 3: Garbage tokens leave the context empty
    #[tokio::test]
    async fn test_invalid_token() {
        let gate = create_test_gate(MockDatabase::new());

        assert_eq!(
            gate.evaluate(Some("Bearer ")).await,
            GateOutcome::InvalidToken(VerifyError::Empty)
        );
        assert_eq!(
            gate.evaluate(Some("Bearer not.a.jwt")).await,
            GateOutcome::InvalidToken(VerifyError::Malformed)
        );

        let foreign = TokenCodec::new("other", Duration::from_secs(60))
            .issue("yoga@studio.com")
            .unwrap();
        assert_eq!(
            gate.evaluate(Some(&bearer(&foreign))).await,
            GateOutcome::InvalidToken(VerifyError::BadSignature)
        );
    }

    // Test 4: Valid token for a deleted user
    #[tokio::test]
    async fn test_unknown_subject() {
        let mut mock_db = MockDatabase::new();
        mock_db.expect_find_user_by_email().returning(|_| Ok(None));
        let gate = create_test_gate(mock_db);

        let token = codec().issue("gone@studio.com").unwrap();
        let outcome = gate.evaluate(Some(&bearer(&token))).await;

        assert_eq!(outcome, GateOutcome::UnknownSubject);
        assert!(!outcome.into_context().is_authenticated());
    }

    // Test 5: Valid token resolves the principal
    #[tokio::test]
    async fn test_resolved() {
        let mut mock_db = MockDatabase::new();
        mock_db
            .expect_find_user_by_email()
            .withf(|email| email == "yoga@studio.com")
            .times(1)
            .returning(|_| {
                Ok(Some(
                    User::new("yoga@studio.com", "Doe", "John", "hash", false).with_id(4),
                ))
            });
        let gate = create_test_gate(mock_db);

        let token = codec().issue("yoga@studio.com").unwrap();
        let context = gate.authenticate(Some(&bearer(&token))).await;

        let principal = context.principal().unwrap();
        assert_eq!(principal.id, 4);
        assert_eq!(principal.username, "yoga@studio.com");
        assert!(!principal.admin);
    }
}
