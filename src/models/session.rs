//! Session domain model and its wire shape

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Bookable session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub id: Option<i64>,

    pub name: String,

    /// When the session takes place
    pub date: DateTime<Utc>,

    pub description: String,

    /// Owning teacher, if any
    pub teacher_id: Option<i64>,

    /// Enrolled user ids, in enrollment order
    pub participants: Vec<i64>,

    pub created_at: Option<DateTime<Utc>>,

    pub updated_at: Option<DateTime<Utc>>,
}

impl Session {
    /// Create a new, unsaved session with no participants
    pub fn new(
        name: impl Into<String>,
        date: DateTime<Utc>,
        description: impl Into<String>,
        teacher_id: Option<i64>,
    ) -> Self {
        Self {
            id: None,
            name: name.into(),
            date,
            description: description.into(),
            teacher_id,
            participants: Vec::new(),
            created_at: None,
            updated_at: None,
        }
    }

    /// Check whether a user is enrolled
    pub fn is_participant(&self, user_id: i64) -> bool {
        self.participants.contains(&user_id)
    }

    /// Append a user to the participant list
    pub fn add_participant(&mut self, user_id: i64) {
        self.participants.push(user_id);
    }

    /// Remove the first occurrence of a user; returns false if none was present
    pub fn remove_participant(&mut self, user_id: i64) -> bool {
        match self.participants.iter().position(|id| *id == user_id) {
            Some(index) => {
                self.participants.remove(index);
                true
            }
            None => false,
        }
    }
}

/// Session as exchanged over the API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionDto {
    #[serde(default)]
    pub id: Option<i64>,

    pub name: String,

    #[serde(with = "flexible_date")]
    pub date: DateTime<Utc>,

    #[serde(rename = "teacher_id", default)]
    pub teacher_id: Option<i64>,

    pub description: String,

    /// Participant user ids
    #[serde(default)]
    pub users: Vec<i64>,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl SessionDto {
    /// Build a domain session from resolved references
    ///
    /// `teacher_id` and `participants` must already be checked against
    /// their repositories; unresolved ids are dropped by the caller.
    pub fn into_session(self, teacher_id: Option<i64>, participants: Vec<i64>) -> Session {
        Session {
            id: self.id,
            name: self.name,
            date: self.date,
            description: self.description,
            teacher_id,
            participants,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

impl From<&Session> for SessionDto {
    fn from(session: &Session) -> Self {
        Self {
            id: session.id,
            name: session.name.clone(),
            date: session.date,
            teacher_id: session.teacher_id,
            description: session.description.clone(),
            users: session.participants.clone(),
            created_at: session.created_at,
            updated_at: session.updated_at,
        }
    }
}

/// Dates are written as RFC 3339 and read from either RFC 3339 or epoch milliseconds
mod flexible_date {
    use chrono::{DateTime, TimeZone, Utc};
    use serde::{de, Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawDate {
        Millis(i64),
        Text(String),
    }

    pub fn serialize<S: Serializer>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&date.to_rfc3339())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        match RawDate::deserialize(deserializer)? {
            RawDate::Millis(millis) => Utc
                .timestamp_millis_opt(millis)
                .single()
                .ok_or_else(|| de::Error::custom("timestamp out of range")),
            RawDate::Text(text) => DateTime::parse_from_rfc3339(&text)
                .map(|d| d.with_timezone(&Utc))
                .map_err(de::Error::custom),
        }
    }
}
