//! User domain model and its wire shape

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Registered user
///
/// The email doubles as the login username and is unique across users.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Database id, `None` until persisted
    pub id: Option<i64>,

    /// Unique email, used as the username
    pub email: String,

    pub last_name: String,

    pub first_name: String,

    /// Argon2 password hash
    pub password: String,

    /// Whether the user has admin rights
    pub admin: bool,

    pub created_at: Option<DateTime<Utc>>,

    pub updated_at: Option<DateTime<Utc>>,
}

impl User {
    /// Create a new, unsaved user
    pub fn new(
        email: impl Into<String>,
        last_name: impl Into<String>,
        first_name: impl Into<String>,
        password: impl Into<String>,
        admin: bool,
    ) -> Self {
        Self {
            id: None,
            email: email.into(),
            last_name: last_name.into(),
            first_name: first_name.into(),
            password: password.into(),
            admin,
            created_at: None,
            updated_at: None,
        }
    }

    /// Set the database id
    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }
}

/// User as returned by the API; the password hash is never included
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    pub id: Option<i64>,
    pub email: String,
    pub last_name: String,
    pub first_name: String,
    pub admin: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<&User> for UserDto {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            last_name: user.last_name.clone(),
            first_name: user.first_name.clone(),
            admin: user.admin,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}
