//! Principal resolution
//!
//! Maps a username (the user's email) to the identity record used by the
//! authentication pipeline.

use std::sync::Arc;

use thiserror::Error;

use crate::database::Database;
use crate::error::DbError;
use crate::models::User;

/// Identity of a registered user as seen by the authentication pipeline
///
/// The password hash is only read by the login path and is not part of
/// [`AuthenticatedUser`], which is what the security context carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub id: i64,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub admin: bool,
    password_hash: String,
}

impl Principal {
    /// Stored password hash
    pub fn password_hash(&self) -> &str {
        &self.password_hash
    }

    /// Public view without credential material
    pub fn to_authenticated(&self) -> AuthenticatedUser {
        AuthenticatedUser {
            id: self.id,
            username: self.username.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            admin: self.admin,
        }
    }
}

impl From<User> for Principal {
    fn from(user: User) -> Self {
        Self {
            id: user.id.unwrap_or_default(),
            username: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            admin: user.admin,
            password_hash: user.password,
        }
    }
}

/// Authenticated caller, free of credential material
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub id: i64,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub admin: bool,
}

/// Principal lookup failure
#[derive(Debug, Error)]
pub enum ResolveError {
    /// No user with that username
    #[error("User Not Found with username: {0}")]
    NotFound(String),

    /// Repository failure
    #[error("Repository error: {0}")]
    Repository(#[from] DbError),
}

/// Resolves usernames through the user repository
pub struct PrincipalStore<D: Database> {
    db: Arc<D>,
}

impl<D: Database> Clone for PrincipalStore<D> {
    fn clone(&self) -> Self {
        Self {
            db: Arc::clone(&self.db),
        }
    }
}

impl<D: Database> PrincipalStore<D> {
    /// Create a store backed by the given repository
    pub fn new(db: Arc<D>) -> Self {
        Self { db }
    }

    /// Look up a principal by username
    pub async fn resolve(&self, username: &str) -> Result<Principal, ResolveError> {
        self.db
            .find_user_by_email(username)
            .await?
            .map(Principal::from)
            .ok_or_else(|| ResolveError::NotFound(username.to_string()))
    }
}
