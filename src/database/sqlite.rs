//! SQLite implementation of the Database trait
//!
//! This module provides a SQLite-based implementation of the Database trait
//! using rusqlite and tokio-rusqlite for async operations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{OptionalExtension, Row};
use tokio_rusqlite::Connection;

use super::migrations::CREATE_SCHEMA;
use super::Database;
use crate::error::DbError;
use crate::models::{Session, Teacher, User};

/// SQLite database implementation
pub struct SqliteDatabase {
    conn: Connection,
}

impl SqliteDatabase {
    /// Create a new SQLite database connection
    ///
    /// Use `:memory:` for in-memory database or a file path for persistent storage.
    pub async fn new(path: &str) -> Result<Self, DbError> {
        let conn = Connection::open(path).await?;

        conn.call(|conn| {
            conn.execute_batch(CREATE_SCHEMA)?;
            Ok(())
        })
        .await?;

        Ok(Self { conn })
    }

    /// Create a new in-memory database (useful for testing)
    pub async fn in_memory() -> Result<Self, DbError> {
        Self::new(":memory:").await
    }
}

const USER_COLUMNS: &str =
    "id, email, last_name, first_name, password, admin, created_at, updated_at";
const TEACHER_COLUMNS: &str = "id, last_name, first_name, created_at, updated_at";
const SESSION_COLUMNS: &str = "id, name, date, description, teacher_id, created_at, updated_at";

#[async_trait]
impl Database for SqliteDatabase {
    // =========================================================================
    // User operations
    // =========================================================================

    async fn find_user(&self, id: i64) -> Result<Option<User>, DbError> {
        self.conn
            .call(move |conn| {
                let user = conn
                    .query_row(
                        &format!("SELECT {} FROM users WHERE id = ?1", USER_COLUMNS),
                        [id],
                        user_from_row,
                    )
                    .optional()?;
                Ok(user)
            })
            .await
            .map_err(into_db_error)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, DbError> {
        let email = email.to_string();

        self.conn
            .call(move |conn| {
                let user = conn
                    .query_row(
                        &format!("SELECT {} FROM users WHERE email = ?1", USER_COLUMNS),
                        [&email],
                        user_from_row,
                    )
                    .optional()?;
                Ok(user)
            })
            .await
            .map_err(into_db_error)
    }

    async fn exists_user_by_email(&self, email: &str) -> Result<bool, DbError> {
        let email = email.to_string();

        self.conn
            .call(move |conn| {
                let exists: bool = conn.query_row(
                    "SELECT EXISTS(SELECT 1 FROM users WHERE email = ?1)",
                    [&email],
                    |row| row.get(0),
                )?;
                Ok(exists)
            })
            .await
            .map_err(into_db_error)
    }

    async fn save_user(&self, user: &User) -> Result<User, DbError> {
        let user = user.clone();
        let now = Utc::now().to_rfc3339();

        self.conn
            .call(move |conn| {
                conn.execute(
                    r#"
                    INSERT INTO users
                    (id, email, last_name, first_name, password, admin, created_at, updated_at)
                    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)
                    ON CONFLICT(id) DO UPDATE SET
                        email = excluded.email,
                        last_name = excluded.last_name,
                        first_name = excluded.first_name,
                        password = excluded.password,
                        admin = excluded.admin,
                        updated_at = excluded.updated_at
                    "#,
                    rusqlite::params![
                        user.id,
                        user.email,
                        user.last_name,
                        user.first_name,
                        user.password,
                        user.admin,
                        now
                    ],
                )?;

                let id = user.id.unwrap_or_else(|| conn.last_insert_rowid());
                let saved = conn.query_row(
                    &format!("SELECT {} FROM users WHERE id = ?1", USER_COLUMNS),
                    [id],
                    user_from_row,
                )?;
                Ok(saved)
            })
            .await
            .map_err(into_db_error)
    }

    async fn delete_user(&self, id: i64) -> Result<(), DbError> {
        let deleted = self
            .conn
            .call(move |conn| Ok(conn.execute("DELETE FROM users WHERE id = ?1", [id])?))
            .await
            .map_err(into_db_error)?;

        if deleted == 0 {
            return Err(DbError::NotFound);
        }
        Ok(())
    }

    // =========================================================================
    // Teacher operations
    // =========================================================================

    async fn find_teacher(&self, id: i64) -> Result<Option<Teacher>, DbError> {
        self.conn
            .call(move |conn| {
                let teacher = conn
                    .query_row(
                        &format!("SELECT {} FROM teachers WHERE id = ?1", TEACHER_COLUMNS),
                        [id],
                        teacher_from_row,
                    )
                    .optional()?;
                Ok(teacher)
            })
            .await
            .map_err(into_db_error)
    }

    async fn list_teachers(&self) -> Result<Vec<Teacher>, DbError> {
        self.conn
            .call(|conn| {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {} FROM teachers ORDER BY id",
                    TEACHER_COLUMNS
                ))?;

                let teachers = stmt
                    .query_map([], teacher_from_row)?
                    .collect::<Result<Vec<_>, _>>()?;

                Ok(teachers)
            })
            .await
            .map_err(into_db_error)
    }

    async fn save_teacher(&self, teacher: &Teacher) -> Result<Teacher, DbError> {
        let teacher = teacher.clone();
        let now = Utc::now().to_rfc3339();

        self.conn
            .call(move |conn| {
                conn.execute(
                    r#"
                    INSERT INTO teachers (id, last_name, first_name, created_at, updated_at)
                    VALUES (?1, ?2, ?3, ?4, ?4)
                    ON CONFLICT(id) DO UPDATE SET
                        last_name = excluded.last_name,
                        first_name = excluded.first_name,
                        updated_at = excluded.updated_at
                    "#,
                    rusqlite::params![teacher.id, teacher.last_name, teacher.first_name, now],
                )?;

                let id = teacher.id.unwrap_or_else(|| conn.last_insert_rowid());
                let saved = conn.query_row(
                    &format!("SELECT {} FROM teachers WHERE id = ?1", TEACHER_COLUMNS),
                    [id],
                    teacher_from_row,
                )?;
                Ok(saved)
            })
            .await
            .map_err(into_db_error)
    }

    // =========================================================================
    // Session operations
    // =========================================================================

    async fn find_session(&self, id: i64) -> Result<Option<Session>, DbError> {
        self.conn
            .call(move |conn| {
                let session = conn
                    .query_row(
                        &format!("SELECT {} FROM sessions WHERE id = ?1", SESSION_COLUMNS),
                        [id],
                        session_from_row,
                    )
                    .optional()?;

                match session {
                    Some(mut session) => {
                        session.participants = load_participants(conn, id)?;
                        Ok(Some(session))
                    }
                    None => Ok(None),
                }
            })
            .await
            .map_err(into_db_error)
    }

    async fn list_sessions(&self) -> Result<Vec<Session>, DbError> {
        self.conn
            .call(|conn| {
                let mut sessions = {
                    let mut stmt = conn.prepare(&format!(
                        "SELECT {} FROM sessions ORDER BY id",
                        SESSION_COLUMNS
                    ))?;
                    let rows = stmt
                        .query_map([], session_from_row)?
                        .collect::<Result<Vec<_>, _>>()?;
                    rows
                };

                for session in sessions.iter_mut() {
                    if let Some(id) = session.id {
                        session.participants = load_participants(conn, id)?;
                    }
                }

                Ok(sessions)
            })
            .await
            .map_err(into_db_error)
    }

    async fn save_session(&self, session: &Session) -> Result<Session, DbError> {
        let session = session.clone();
        let now = Utc::now().to_rfc3339();

        self.conn
            .call(move |conn| {
                let tx = conn.transaction()?;

                tx.execute(
                    r#"
                    INSERT INTO sessions
                    (id, name, date, description, teacher_id, created_at, updated_at)
                    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
                    ON CONFLICT(id) DO UPDATE SET
                        name = excluded.name,
                        date = excluded.date,
                        description = excluded.description,
                        teacher_id = excluded.teacher_id,
                        updated_at = excluded.updated_at
                    "#,
                    rusqlite::params![
                        session.id,
                        session.name,
                        session.date.to_rfc3339(),
                        session.description,
                        session.teacher_id,
                        now
                    ],
                )?;

                let id = session.id.unwrap_or_else(|| tx.last_insert_rowid());

                tx.execute("DELETE FROM participate WHERE session_id = ?1", [id])?;
                {
                    let mut stmt = tx.prepare(
                        "INSERT INTO participate (session_id, user_id) VALUES (?1, ?2)",
                    )?;
                    for user_id in &session.participants {
                        stmt.execute(rusqlite::params![id, user_id])?;
                    }
                }

                let mut saved = tx.query_row(
                    &format!("SELECT {} FROM sessions WHERE id = ?1", SESSION_COLUMNS),
                    [id],
                    session_from_row,
                )?;
                saved.participants = load_participants(&tx, id)?;

                tx.commit()?;
                Ok(saved)
            })
            .await
            .map_err(into_db_error)
    }

    async fn delete_session(&self, id: i64) -> Result<(), DbError> {
        let deleted = self
            .conn
            .call(move |conn| Ok(conn.execute("DELETE FROM sessions WHERE id = ?1", [id])?))
            .await
            .map_err(into_db_error)?;

        if deleted == 0 {
            return Err(DbError::NotFound);
        }
        Ok(())
    }
}

/// Participant ids of a session in enrollment order
fn load_participants(conn: &rusqlite::Connection, session_id: i64) -> rusqlite::Result<Vec<i64>> {
    let mut stmt =
        conn.prepare("SELECT user_id FROM participate WHERE session_id = ?1 ORDER BY id")?;
    let ids = stmt
        .query_map([session_id], |row| row.get(0))?
        .collect::<Result<Vec<i64>, _>>()?;
    Ok(ids)
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: Some(row.get(0)?),
        email: row.get(1)?,
        last_name: row.get(2)?,
        first_name: row.get(3)?,
        password: row.get(4)?,
        admin: row.get(5)?,
        created_at: parse_datetime(row.get::<_, Option<String>>(6)?),
        updated_at: parse_datetime(row.get::<_, Option<String>>(7)?),
    })
}

fn teacher_from_row(row: &Row<'_>) -> rusqlite::Result<Teacher> {
    Ok(Teacher {
        id: Some(row.get(0)?),
        last_name: row.get(1)?,
        first_name: row.get(2)?,
        created_at: parse_datetime(row.get::<_, Option<String>>(3)?),
        updated_at: parse_datetime(row.get::<_, Option<String>>(4)?),
    })
}

fn session_from_row(row: &Row<'_>) -> rusqlite::Result<Session> {
    let date: String = row.get(2)?;
    let date = parse_datetime(Some(date)).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            2,
            rusqlite::types::Type::Text,
            "invalid session date".into(),
        )
    })?;

    Ok(Session {
        id: Some(row.get(0)?),
        name: row.get(1)?,
        date,
        description: row.get(3)?,
        teacher_id: row.get(4)?,
        participants: Vec::new(),
        created_at: parse_datetime(row.get::<_, Option<String>>(5)?),
        updated_at: parse_datetime(row.get::<_, Option<String>>(6)?),
    })
}

/// Surface unique/foreign key failures as constraint violations
fn into_db_error(err: tokio_rusqlite::Error) -> DbError {
    match err {
        tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(code, message))
            if code.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            DbError::ConstraintViolation(message.unwrap_or_else(|| code.to_string()))
        }
        tokio_rusqlite::Error::Rusqlite(e) => DbError::Sqlite(e),
        other => DbError::Connection(other),
    }
}

/// Parse datetime string from SQLite
fn parse_datetime(s: Option<String>) -> Option<DateTime<Utc>> {
    s.and_then(|s| {
        DateTime::parse_from_rfc3339(&s)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
            .or_else(|| {
                // SQLite CURRENT_TIMESTAMP format
                chrono::NaiveDateTime::parse_from_str(&s, "%Y-%m-%d %H:%M:%S")
                    .ok()
                    .map(|dt| dt.and_utc())
            })
    })
}
