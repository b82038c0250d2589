//! Session enrollment
//!
//! Join and leave are read-modify-write cycles on the session's participant
//! list. Concurrent writes to the same session are serialized by the
//! repository, not here.

use std::sync::Arc;

use crate::database::Database;
use crate::error::ServiceError;
use crate::models::Session;

/// Applies join/leave transitions to a session's participants
pub struct EnrollmentService<D: Database> {
    db: Arc<D>,
}

impl<D: Database> Clone for EnrollmentService<D> {
    fn clone(&self) -> Self {
        Self {
            db: Arc::clone(&self.db),
        }
    }
}

impl<D: Database> EnrollmentService<D> {
    pub fn new(db: Arc<D>) -> Self {
        Self { db }
    }

    /// Enroll a user in a session
    ///
    /// Both records are loaded before either absence is reported. An existing
    /// membership is not checked: joining twice records the user twice.
    pub async fn join(&self, session_id: i64, user_id: i64) -> Result<Session, ServiceError> {
        let session = self.db.find_session(session_id).await?;
        let user = self.db.find_user(user_id).await?;

        let (mut session, _user) = match (session, user) {
            (Some(session), Some(user)) => (session, user),
            _ => return Err(ServiceError::NotFound),
        };

        if session.is_participant(user_id) {
            tracing::warn!(
                session_id,
                user_id,
                "User is already enrolled, recording a duplicate membership"
            );
        }

        session.add_participant(user_id);
        let saved = self.db.save_session(&session).await?;

        tracing::info!(session_id, user_id, "User joined session");
        Ok(saved)
    }

    /// Remove a user from a session
    ///
    /// Fails with `BadRequest` when the user is not enrolled. Only one
    /// membership is removed per call.
    pub async fn leave(&self, session_id: i64, user_id: i64) -> Result<Session, ServiceError> {
        let mut session = self
            .db
            .find_session(session_id)
            .await?
            .ok_or(ServiceError::NotFound)?;

        if !session.remove_participant(user_id) {
            return Err(ServiceError::BadRequest(
                "User already does not participate in this session".to_string(),
            ));
        }

        let saved = self.db.save_session(&session).await?;

        tracing::info!(session_id, user_id, "User left session");
        Ok(saved)
    }
}
