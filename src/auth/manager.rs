//! Authentication manager
//!
//! Checks username/password credentials at login. Per-request token
//! authentication lives in [`super::gate`].

use async_trait::async_trait;

use crate::database::Database;
use crate::error::AuthError;

use super::password::verify_password;
use super::principal::{AuthenticatedUser, PrincipalStore, ResolveError};

/// Credential check used by the login endpoint
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Authenticate a username/password pair
    ///
    /// Unknown users and wrong passwords both yield `AuthError::BadCredentials`.
    async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<AuthenticatedUser, AuthError>;
}

/// Authenticator backed by the user repository and Argon2 hashes
pub struct CredentialsAuthenticator<D: Database> {
    principals: PrincipalStore<D>,
}

impl<D: Database> CredentialsAuthenticator<D> {
    /// Create an authenticator resolving principals through `principals`
    pub fn new(principals: PrincipalStore<D>) -> Self {
        Self { principals }
    }
}

#[async_trait]
impl<D: Database + 'static> Authenticator for CredentialsAuthenticator<D> {
    async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<AuthenticatedUser, AuthError> {
        let principal = match self.principals.resolve(username).await {
            Ok(principal) => principal,
            Err(ResolveError::NotFound(_)) => {
                tracing::debug!("Login rejected: unknown username");
                return Err(AuthError::BadCredentials);
            }
            Err(ResolveError::Repository(e)) => {
                tracing::error!(error = %e, "Failed to resolve principal during login");
                return Err(AuthError::BadCredentials);
            }
        };

        if !verify_password(password, principal.password_hash()) {
            tracing::debug!(user_id = principal.id, "Login rejected: wrong password");
            return Err(AuthError::BadCredentials);
        }

        Ok(principal.to_authenticated())
    }
}
