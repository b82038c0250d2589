//! Database layer for session-booking
//!
//! This module defines the repository trait and its SQLite implementation.

pub mod migrations;
pub mod sqlite;

pub use sqlite::SqliteDatabase;

use async_trait::async_trait;

use crate::error::DbError;
use crate::models::{Session, Teacher, User};

/// Database trait for data persistence
///
/// This trait is the repository collaborator for users, teachers and sessions.
/// It uses `async_trait` for async methods and `mockall::automock` for testing.
/// `save_*` inserts when the record has no id and upserts by id otherwise,
/// returning the stored record with its id and audit timestamps filled in.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Database: Send + Sync {
    // =========================================================================
    // User operations
    // =========================================================================

    /// Get a user by id
    async fn find_user(&self, id: i64) -> Result<Option<User>, DbError>;

    /// Get a user by email (the login username)
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, DbError>;

    /// Check whether an email is already registered
    async fn exists_user_by_email(&self, email: &str) -> Result<bool, DbError>;

    /// Insert or update a user
    async fn save_user(&self, user: &User) -> Result<User, DbError>;

    /// Delete a user by id, also dropping their enrollments
    async fn delete_user(&self, id: i64) -> Result<(), DbError>;

    // =========================================================================
    // Teacher operations
    // =========================================================================

    /// Get a teacher by id
    async fn find_teacher(&self, id: i64) -> Result<Option<Teacher>, DbError>;

    /// List all teachers
    async fn list_teachers(&self) -> Result<Vec<Teacher>, DbError>;

    /// Insert or update a teacher
    async fn save_teacher(&self, teacher: &Teacher) -> Result<Teacher, DbError>;

    // =========================================================================
    // Session operations
    // =========================================================================

    /// Get a session by id, including its participants
    async fn find_session(&self, id: i64) -> Result<Option<Session>, DbError>;

    /// List all sessions, including their participants
    async fn list_sessions(&self) -> Result<Vec<Session>, DbError>;

    /// Insert or update a session and replace its participant rows
    async fn save_session(&self, session: &Session) -> Result<Session, DbError>;

    /// Delete a session by id
    async fn delete_session(&self, id: i64) -> Result<(), DbError>;
}
