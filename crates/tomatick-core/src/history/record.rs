use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;
use crate::user::UserId;

pub const MAX_DESCRIPTION_CHARS: usize = 100;

pub type SessionId = Uuid;

/// A completed focus interval. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    #[serde(rename = "id")]
    pub session_id: SessionId,
    #[serde(skip_serializing)]
    pub user_id: UserId,
    pub description: String,
    pub start_timestamp: DateTime<Utc>,
    pub duration_minutes: u32,
}

/// Validated input for [`crate::history::HistoryStore::append`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSession {
    description: String,
    start_timestamp: DateTime<Utc>,
    duration_minutes: u32,
}

impl NewSession {
    pub fn new(
        description: impl Into<String>,
        start_timestamp: DateTime<Utc>,
        duration_minutes: i64,
    ) -> Result<Self, ValidationError> {
        let description = description.into();
        let len = description.chars().count();
        if len > MAX_DESCRIPTION_CHARS {
            return Err(ValidationError::TooLong {
                field: "description",
                max: MAX_DESCRIPTION_CHARS,
                len,
            });
        }

        let duration_minutes = u32::try_from(duration_minutes)
            .ok()
            .filter(|minutes| *minutes > 0)
            .ok_or(ValidationError::NotPositive {
                field: "durationMinutes",
                value: duration_minutes,
            })?;

        Ok(Self {
            description,
            start_timestamp,
            duration_minutes,
        })
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn start_timestamp(&self) -> DateTime<Utc> {
        self.start_timestamp
    }

    pub fn duration_minutes(&self) -> u32 {
        self.duration_minutes
    }

    pub(crate) fn into_record(self, user_id: UserId) -> SessionRecord {
        SessionRecord {
            session_id: Uuid::new_v4(),
            user_id,
            description: self.description,
            start_timestamp: self.start_timestamp,
            duration_minutes: self.duration_minutes,
        }
    }
}

/// Wire shape accepted when a caller creates a history entry directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionRequest {
    #[serde(default)]
    pub description: Option<String>,
    /// ISO-8601 / RFC 3339 instant
    pub start_timestamp: String,
    pub duration_minutes: i64,
}

impl TryFrom<CreateSessionRequest> for NewSession {
    type Error = ValidationError;

    fn try_from(request: CreateSessionRequest) -> Result<Self, Self::Error> {
        let start = DateTime::parse_from_rfc3339(&request.start_timestamp)
            .map(|ts| ts.with_timezone(&Utc))
            .map_err(|err| ValidationError::InvalidTimestamp {
                value: request.start_timestamp.clone(),
                message: err.to_string(),
            })?;
        NewSession::new(
            request.description.unwrap_or_default(),
            start,
            request.duration_minutes,
        )
    }
}
