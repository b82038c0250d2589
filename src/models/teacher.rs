//! Teacher domain model and its wire shape

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Teacher who can own sessions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Teacher {
    pub id: Option<i64>,
    pub last_name: String,
    pub first_name: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Teacher {
    /// Create a new, unsaved teacher
    pub fn new(last_name: impl Into<String>, first_name: impl Into<String>) -> Self {
        Self {
            id: None,
            last_name: last_name.into(),
            first_name: first_name.into(),
            created_at: None,
            updated_at: None,
        }
    }
}

/// Teacher as returned by the API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeacherDto {
    pub id: Option<i64>,
    pub last_name: String,
    pub first_name: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<&Teacher> for TeacherDto {
    fn from(teacher: &Teacher) -> Self {
        Self {
            id: teacher.id,
            last_name: teacher.last_name.clone(),
            first_name: teacher.first_name.clone(),
            created_at: teacher.created_at,
            updated_at: teacher.updated_at,
        }
    }
}
