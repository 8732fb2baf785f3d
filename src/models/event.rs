use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;

use super::{EventId, HoleId, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "event_type", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum EventType {
    Birthday,
    Wedding,
    Christening,
    Other,
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            EventType::Birthday => "BIRTHDAY",
            EventType::Wedding => "WEDDING",
            EventType::Christening => "CHRISTENING",
            EventType::Other => "OTHER",
        };
        f.write_str(tag)
    }
}

impl FromStr for EventType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "BIRTHDAY" => Ok(EventType::Birthday),
            "WEDDING" => Ok(EventType::Wedding),
            "CHRISTENING" => Ok(EventType::Christening),
            "OTHER" => Ok(EventType::Other),
            other => Err(format!("unknown event type `{other}`")),
        }
    }
}

/// Lifecycle of an event once it exists. `Passed` is advisory: nothing
/// refuses seat or option changes on a passed event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EventStatus {
    Active,
    Passed,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq)]
pub struct Event {
    pub id: EventId,
    pub user_id: UserId,
    pub hole_id: HoleId,
    pub description: String,
    pub event_type: EventType,
    pub date_created: DateTime<Utc>,
    pub date_planned: Option<NaiveDate>,
    pub is_passed: bool,
}

impl Event {
    pub fn status(&self) -> EventStatus {
        if self.is_passed {
            EventStatus::Passed
        } else {
            EventStatus::Active
        }
    }

    pub fn is_owned_by(&self, user_id: UserId) -> bool {
        self.user_id == user_id
    }
}

#[derive(Debug, Clone)]
pub struct NewEvent {
    pub owner: UserId,
    pub hole_id: HoleId,
    pub description: String,
    pub event_type: EventType,
    pub date_planned: Option<NaiveDate>,
}
