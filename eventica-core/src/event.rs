//! Event types.
//!
//! `Event` is the record as it is persisted. `EventInput` is what callers send
//! to create or update one, and `PublicEvent` is the shape the listing
//! front-end reads back.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Stands in for "no time specified".
pub const TIME_TBD: &str = "Time TBD";
pub const DEFAULT_LOCATION: &str = "Location TBD";
pub const DEFAULT_IMAGE: &str = "https://via.placeholder.com/400x200?text=Event+Image";
pub const DEFAULT_WEBSITE: &str = "#";

fn default_time() -> String {
    TIME_TBD.to_string()
}

fn default_location() -> String {
    DEFAULT_LOCATION.to_string()
}

fn default_image() -> String {
    DEFAULT_IMAGE.to_string()
}

fn default_website() -> String {
    DEFAULT_WEBSITE.to_string()
}

/// A listed event.
///
/// Field order matches the persisted layout of `events.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    #[serde(default, deserialize_with = "deserialize_id")]
    pub id: String,
    pub title: String,
    /// Canonical `DD-MM-YYYY`
    pub date: String,
    /// `H:MMam`, `H:MMam - H:MMpm` or `Time TBD`
    #[serde(default = "default_time")]
    pub time: String,
    #[serde(default = "default_location")]
    pub location: String,
    pub description: String,
    #[serde(default = "default_image")]
    pub image: String,
    #[serde(default = "default_website")]
    pub website: String,

    // Only kept by the document store
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Older exports carry numeric ids; accept both and keep strings.
fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(i64),
    }

    Ok(match Option::<RawId>::deserialize(deserializer)? {
        Some(RawId::Text(s)) => s,
        Some(RawId::Number(n)) => n.to_string(),
        None => String::new(),
    })
}

impl Event {
    /// The numeric value of `id`, or 0 when it is not a number.
    pub fn numeric_id(&self) -> u64 {
        numeric_id(&self.id)
    }
}

/// Numeric value of an event id, or 0 when it is not a number.
pub fn numeric_id(id: &str) -> u64 {
    id.trim().parse().unwrap_or(0)
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.title)
    }
}

/// Payload for creating or updating an event.
///
/// Every field is optional at the type level so a missing title surfaces as a
/// validation error instead of a deserialization failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventInput {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    /// Start time, 24-hour `HH:MM`
    #[serde(default)]
    pub time: Option<String>,
    /// End time, 24-hour `HH:MM`
    #[serde(default)]
    pub end_time: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
}

/// Trimmed value of an optional field, `None` when absent or blank.
pub fn field(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Event as returned by the listing endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicEvent {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub description: String,
    pub time: String,
    pub location: String,
    pub image: String,
    pub website: String,
    pub date: String,
}

impl From<Event> for PublicEvent {
    fn from(event: Event) -> Self {
        PublicEvent {
            id: event.id,
            title: event.title,
            description: event.description,
            time: event.time,
            location: event.location,
            image: event.image,
            website: event.website,
            date: event.date,
        }
    }
}
