//! Session CRUD with reference resolution

use std::sync::Arc;

use crate::database::Database;
use crate::error::ServiceError;
use crate::models::{Session, SessionDto};

/// Session reads and writes
///
/// Incoming payloads carry a teacher id and participant ids; ids that do not
/// resolve to stored records are dropped before saving.
pub struct SessionService<D: Database> {
    db: Arc<D>,
}

impl<D: Database> Clone for SessionService<D> {
    fn clone(&self) -> Self {
        Self {
            db: Arc::clone(&self.db),
        }
    }
}

impl<D: Database> SessionService<D> {
    pub fn new(db: Arc<D>) -> Self {
        Self { db }
    }

    pub async fn list(&self) -> Result<Vec<Session>, ServiceError> {
        Ok(self.db.list_sessions().await?)
    }

    pub async fn find(&self, id: i64) -> Result<Session, ServiceError> {
        self.db.find_session(id).await?.ok_or(ServiceError::NotFound)
    }

    pub async fn create(&self, dto: SessionDto) -> Result<Session, ServiceError> {
        let mut session = self.resolve(dto).await?;
        session.id = None;

        let saved = self.db.save_session(&session).await?;
        tracing::info!(session_id = ?saved.id, "Session created");
        Ok(saved)
    }

    /// Store the payload under `id`, replacing whatever is there
    pub async fn update(&self, id: i64, dto: SessionDto) -> Result<Session, ServiceError> {
        let mut session = self.resolve(dto).await?;
        session.id = Some(id);

        let saved = self.db.save_session(&session).await?;
        tracing::info!(session_id = id, "Session updated");
        Ok(saved)
    }

    pub async fn delete(&self, id: i64) -> Result<(), ServiceError> {
        if self.db.find_session(id).await?.is_none() {
            return Err(ServiceError::NotFound);
        }

        self.db.delete_session(id).await?;
        tracing::info!(session_id = id, "Session deleted");
        Ok(())
    }

    async fn resolve(&self, dto: SessionDto) -> Result<Session, ServiceError> {
        let teacher_id = match dto.teacher_id {
            Some(id) => self.db.find_teacher(id).await?.map(|_| id),
            None => None,
        };

        let mut participants = Vec::with_capacity(dto.users.len());
        for user_id in &dto.users {
            if self.db.find_user(*user_id).await?.is_some() {
                participants.push(*user_id);
            }
        }

        Ok(dto.into_session(teacher_id, participants))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MockDatabase;
    use crate::models::{Teacher, User};
    use chrono::Utc;

    fn dto(teacher_id: Option<i64>, users: Vec<i64>) -> SessionDto {
        SessionDto {
            id: Some(99),
            name: "Yoga".to_string(),
            date: Utc::now(),
            teacher_id,
            description: "Morning flow".to_string(),
            users,
            created_at: None,
            updated_at: None,
        }
    }

    fn create_test_service(mock_db: MockDatabase) -> SessionService<MockDatabase> {
        SessionService::new(Arc::new(mock_db))
    }

    // Test 1: create resolves references and ignores the payload id
    #[tokio::test]
    async fn test_create_resolves_references() {
        let mut mock_db = MockDatabase::new();
        mock_db
            .expect_find_teacher()
            .withf(|id| *id == 1)
            .returning(|_| Ok(Some(Teacher::new("DELAHAYE", "Margot"))));
        mock_db.expect_find_user().returning(|id| {
            if id == 2 {
                Ok(Some(User::new("a@b.com", "Doe", "John", "h", false).with_id(2)))
            } else {
                Ok(None)
            }
        });
        mock_db
            .expect_save_session()
            .withf(|s| s.id.is_none() && s.teacher_id == Some(1) && s.participants == vec![2])
            .times(1)
            .returning(|s| {
                let mut saved = s.clone();
                saved.id = Some(10);
                Ok(saved)
            });

        let service = create_test_service(mock_db);
        let saved = service.create(dto(Some(1), vec![2, 7])).await.unwrap();

        assert_eq!(saved.id, Some(10));
    }

    // Test 2: unknown teacher is dropped
    #[tokio::test]
    async fn test_create_unknown_teacher() {
        let mut mock_db = MockDatabase::new();
        mock_db.expect_find_teacher().returning(|_| Ok(None));
        mock_db
            .expect_save_session()
            .withf(|s| s.teacher_id.is_none())
            .returning(|s| Ok(s.clone()));

        let service = create_test_service(mock_db);

        assert!(service.create(dto(Some(5), vec![])).await.is_ok());
    }

    // Test 3: update stores under the path id
    #[tokio::test]
    async fn test_update_uses_path_id() {
        let mut mock_db = MockDatabase::new();
        mock_db
            .expect_save_session()
            .withf(|s| s.id == Some(3))
            .returning(|s| Ok(s.clone()));

        let service = create_test_service(mock_db);
        let saved = service.update(3, dto(None, vec![])).await.unwrap();

        assert_eq!(saved.id, Some(3));
    }

    // Test 4: find on a missing session
    #[tokio::test]
    async fn test_find_not_found() {
        let mut mock_db = MockDatabase::new();
        mock_db.expect_find_session().returning(|_| Ok(None));

        let service = create_test_service(mock_db);

        assert!(matches!(service.find(1).await, Err(ServiceError::NotFound)));
    }

    // Test 5: delete checks existence first
    #[tokio::test]
    async fn test_delete_not_found() {
        let mut mock_db = MockDatabase::new();
        mock_db.expect_find_session().returning(|_| Ok(None));
        mock_db.expect_delete_session().never();

        let service = create_test_service(mock_db);

        assert!(matches!(service.delete(1).await, Err(ServiceError::NotFound)));
    }

    // Test 6: delete an existing session
    #[tokio::test]
    async fn test_delete_success() {
        let mut mock_db = MockDatabase::new();
        mock_db
            .expect_find_session()
            .returning(|_| Ok(Some(Session::new("Yoga", Utc::now(), "d", None))));
        mock_db
            .expect_delete_session()
            .withf(|id| *id == 1)
            .times(1)
            .returning(|_| Ok(()));

        let service = create_test_service(mock_db);

        assert!(service.delete(1).await.is_ok());
    }
}
