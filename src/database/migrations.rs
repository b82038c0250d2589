//! Database migrations for session-booking
//!
//! This module contains SQL migrations for the SQLite database schema.

/// SQL statement to create the initial database schema
pub const CREATE_SCHEMA: &str = r#"
PRAGMA foreign_keys = ON;

-- Users table, email is the login username
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    email TEXT NOT NULL UNIQUE,
    last_name TEXT NOT NULL,
    first_name TEXT NOT NULL,
    password TEXT NOT NULL,
    admin INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

-- Teachers table
CREATE TABLE IF NOT EXISTS teachers (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    last_name TEXT NOT NULL,
    first_name TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

-- Sessions table
CREATE TABLE IF NOT EXISTS sessions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    date TEXT NOT NULL,
    description TEXT NOT NULL,
    teacher_id INTEGER REFERENCES teachers(id) ON DELETE SET NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

-- Enrollment rows; id keeps enrollment order, no uniqueness on the pair
CREATE TABLE IF NOT EXISTS participate (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    session_id INTEGER NOT NULL REFERENCES sessions(id) ON DELETE CASCADE,
    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_participate_session ON participate(session_id);
CREATE INDEX IF NOT EXISTS idx_participate_user ON participate(user_id);
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    fn open() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(CREATE_SCHEMA).unwrap();
        conn
    }

    #[test]
    fn test_create_schema_valid_sql() {
        let conn = open();

        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .filter_map(Result::ok)
            .collect();

        assert!(tables.contains(&"users".to_string()));
        assert!(tables.contains(&"teachers".to_string()));
        assert!(tables.contains(&"sessions".to_string()));
        assert!(tables.contains(&"participate".to_string()));
    }

    #[test]
    fn test_schema_is_idempotent() {
        let conn = open();
        conn.execute_batch(CREATE_SCHEMA).unwrap();
    }

    #[test]
    fn test_users_email_unique() {
        let conn = open();

        conn.execute(
            "INSERT INTO users (email, last_name, first_name, password, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?)",
            ["a@b.com", "Doe", "John", "hash", "t", "t"],
        )
        .unwrap();

        let result = conn.execute(
            "INSERT INTO users (email, last_name, first_name, password, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?)",
            ["a@b.com", "Roe", "Jane", "hash", "t", "t"],
        );

        assert!(result.is_err());
    }

    #[test]
    fn test_participate_cascades_on_user_delete() {
        let conn = open();

        conn.execute(
            "INSERT INTO users (id, email, last_name, first_name, password, created_at, updated_at) VALUES (1, 'a@b.com', 'Doe', 'John', 'h', 't', 't')",
            [],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO sessions (id, name, date, description, created_at, updated_at) VALUES (1, 'Yoga', 'd', 'desc', 't', 't')",
            [],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO participate (session_id, user_id) VALUES (1, 1)",
            [],
        )
        .unwrap();

        conn.execute("DELETE FROM users WHERE id = 1", []).unwrap();

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM participate", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }
}
