//! Login, registration and account deletion

use std::sync::Arc;

use crate::auth::{hash_password, AuthenticatedUser, Authenticator, TokenCodec};
use crate::database::Database;
use crate::error::{DbError, ServiceError};
use crate::models::{JwtResponse, LoginRequest, SignupRequest, User};

/// Account operations backed by the user repository
pub struct AccountService<D: Database> {
    db: Arc<D>,
    authenticator: Arc<dyn Authenticator>,
    codec: Arc<TokenCodec>,
}

impl<D: Database> Clone for AccountService<D> {
    fn clone(&self) -> Self {
        Self {
            db: Arc::clone(&self.db),
            authenticator: Arc::clone(&self.authenticator),
            codec: Arc::clone(&self.codec),
        }
    }
}

impl<D: Database> AccountService<D> {
    pub fn new(db: Arc<D>, authenticator: Arc<dyn Authenticator>, codec: Arc<TokenCodec>) -> Self {
        Self {
            db,
            authenticator,
            codec,
        }
    }

    /// Authenticate credentials and issue a bearer token
    ///
    /// The admin flag in the response is read from the repository; a user
    /// missing there, or a failed lookup, is reported as non-admin.
    pub async fn login(&self, request: &LoginRequest) -> Result<JwtResponse, ServiceError> {
        let user = self
            .authenticator
            .authenticate(&request.email, &request.password)
            .await?;

        let token = self.codec.issue(&user.username)?;

        let admin = match self.db.find_user_by_email(&user.username).await {
            Ok(stored) => stored.map(|stored| stored.admin).unwrap_or(false),
            Err(e) => {
                tracing::error!(error = %e, user_id = user.id, "Failed to read admin flag at login");
                false
            }
        };

        tracing::info!(user_id = user.id, "User logged in");

        Ok(JwtResponse::bearer(
            token,
            user.id,
            user.username,
            user.first_name,
            user.last_name,
            admin,
        ))
    }

    /// Create a non-admin account
    pub async fn register(&self, request: &SignupRequest) -> Result<User, ServiceError> {
        if self.db.exists_user_by_email(&request.email).await? {
            return Err(ServiceError::EmailTaken);
        }

        let password = hash_password(&request.password)?;
        let user = User::new(
            request.email.clone(),
            request.last_name.clone(),
            request.first_name.clone(),
            password,
            false,
        );

        // A concurrent registration can claim the email after the check above
        let saved = self.db.save_user(&user).await.map_err(|e| match e {
            DbError::ConstraintViolation(detail) => {
                tracing::info!(detail = %detail, "Registration lost race for email");
                ServiceError::EmailTaken
            }
            other => ServiceError::Database(other),
        })?;
        tracing::info!(user_id = ?saved.id, "User registered");
        Ok(saved)
    }

    /// Delete an account on behalf of its owner
    ///
    /// Only the user whose email matches the acting principal's username may
    /// delete the account.
    pub async fn delete_account(
        &self,
        id: i64,
        acting: &AuthenticatedUser,
    ) -> Result<(), ServiceError> {
        let user = self.db.find_user(id).await?.ok_or(ServiceError::NotFound)?;

        if user.email != acting.username {
            tracing::warn!(
                user_id = id,
                acting_user_id = acting.id,
                "Refused to delete another user's account"
            );
            return Err(ServiceError::Unauthorized);
        }

        self.db.delete_user(id).await?;
        tracing::info!(user_id = id, "User deleted");
        Ok(())
    }
}
