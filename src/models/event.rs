//! Event model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::utils::helpers::{event_timing, EventTiming};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub event_id: i64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(with = "timestamp")]
    pub event_date: DateTime<Utc>,
    pub created_by: i64,
    #[serde(default)]
    pub creator_name: Option<String>,
    /// Absent from the "my events" response
    #[serde(default)]
    pub registration_count: i64,
    #[serde(default, with = "optional_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    /// Only present in the "my events" response
    #[serde(default, with = "optional_timestamp", skip_serializing_if = "Option::is_none")]
    pub registered_at: Option<DateTime<Utc>>,
}

impl Event {
    pub fn timing(&self, now: DateTime<Utc>) -> EventTiming {
        event_timing(self.event_date, now)
    }

    /// Registration is closed once the event date has passed
    pub fn has_ended(&self, now: DateTime<Utc>) -> bool {
        self.event_date < now
    }

    pub fn is_upcoming(&self, now: DateTime<Utc>) -> bool {
        self.event_date > now
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateEventRequest {
    pub title: String,
    pub description: String,
    pub location: String,
    #[serde(with = "timestamp")]
    pub event_date: DateTime<Utc>,
}

/// Body of every mutating endpoint and every error response
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiMessage {
    #[serde(default)]
    pub message: Option<String>,
}

/// Lenient timestamp (de)serialization: writes RFC 3339, reads anything
/// `parse_timestamp` understands.
pub(crate) mod timestamp {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    use crate::utils::helpers::parse_timestamp;

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_timestamp(&raw).ok_or_else(|| D::Error::custom(format!("invalid timestamp: {}", raw)))
    }
}

pub(crate) mod optional_timestamp {
    use chrono::{DateTime, Utc};
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    use crate::utils::helpers::parse_timestamp;

    pub fn serialize<S: Serializer>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(value) => super::timestamp::serialize(value, serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            None => Ok(None),
            Some(raw) => parse_timestamp(&raw)
                .map(Some)
                .ok_or_else(|| D::Error::custom(format!("invalid timestamp: {}", raw))),
        }
    }
}
