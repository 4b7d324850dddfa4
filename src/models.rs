//! Value types exchanged between the client, its callers and providers.
//!
//! Field names follow the camelCase shapes calendar bridges use on the wire.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Authorization level reported by a provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionStatus {
    Authorized,
    Denied,
    Restricted,
    Undetermined,
}

impl PermissionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PermissionStatus::Authorized => "authorized",
            PermissionStatus::Denied => "denied",
            PermissionStatus::Restricted => "restricted",
            PermissionStatus::Undetermined => "undetermined",
        }
    }
}

impl fmt::Display for PermissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Event availability (busy/free time)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Availability {
    #[default]
    Busy,
    Free,
    Tentative,
}

impl Availability {
    /// Map a caller-supplied name, anything unknown is busy
    pub fn from_name(name: &str) -> Self {
        match name {
            "free" => Availability::Free,
            "tentative" => Availability::Tentative,
            _ => Availability::Busy,
        }
    }

    /// Numeric code used by content stores
    pub fn code(&self) -> i32 {
        match self {
            Availability::Busy => 0,
            Availability::Free => 1,
            Availability::Tentative => 2,
        }
    }

    /// Parse one token of an allowed-availability list.
    ///
    /// Stores write either numeric codes or `AVAILABILITY_*` names.
    pub fn from_store_token(token: &str) -> Option<Self> {
        match token.trim() {
            "0" | "AVAILABILITY_BUSY" => Some(Availability::Busy),
            "1" | "AVAILABILITY_FREE" => Some(Availability::Free),
            "2" | "AVAILABILITY_TENTATIVE" => Some(Availability::Tentative),
            _ => None,
        }
    }

    /// Parse a comma separated allowed-availability list, skipping unknown tokens
    pub fn parse_store_list(list: &str) -> Vec<Self> {
        list.split(',').filter_map(Self::from_store_token).collect()
    }
}

/// Calendar access level with its content-store constant
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AccessLevel {
    #[default]
    None,
    Freebusy,
    Read,
    Respond,
    Override,
    Contributor,
    Editor,
    Owner,
    Root,
}

impl AccessLevel {
    /// Map an access level name, anything unknown is `None`
    pub fn from_name(name: &str) -> Self {
        match name {
            "freebusy" => AccessLevel::Freebusy,
            "read" => AccessLevel::Read,
            "respond" => AccessLevel::Respond,
            "override" => AccessLevel::Override,
            "contributor" => AccessLevel::Contributor,
            "editor" => AccessLevel::Editor,
            "owner" => AccessLevel::Owner,
            "root" => AccessLevel::Root,
            _ => AccessLevel::None,
        }
    }

    pub fn code(&self) -> i32 {
        match self {
            AccessLevel::None => 0,
            AccessLevel::Freebusy => 100,
            AccessLevel::Read => 200,
            AccessLevel::Respond => 300,
            AccessLevel::Override => 400,
            AccessLevel::Contributor => 500,
            AccessLevel::Editor => 600,
            AccessLevel::Owner => 700,
            AccessLevel::Root => 800,
        }
    }

    /// Whether events in a calendar with this level can be modified
    pub fn allows_modifications(&self) -> bool {
        *self >= AccessLevel::Contributor
    }
}

/// Account a calendar belongs to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CalendarSource {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub source_type: Option<String>,
    #[serde(default)]
    pub is_local_account: bool,
}

/// A calendar as reported by a provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Calendar {
    pub id: String,
    pub title: String,
    pub name: Option<String>,
    pub color: Option<i32>,
    pub source: String,
    pub source_type: Option<String>,
    #[serde(default)]
    pub is_local_account: bool,
    #[serde(default)]
    pub access_level: AccessLevel,
    pub owner_account: Option<String>,
    #[serde(default)]
    pub allowed_availabilities: Vec<Availability>,
    #[serde(default)]
    pub allows_modifications: bool,
}

/// Options a caller passes to `save_calendar`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CalendarOptions {
    pub title: Option<String>,
    pub name: Option<String>,
    /// Human-readable colour such as `#ff0000` or `tomato`
    pub color: Option<String>,
    pub access_level: Option<String>,
    pub owner_account: Option<String>,
    pub source: Option<CalendarSource>,
}

impl CalendarOptions {
    /// Build the provider-facing options with an already converted colour
    pub fn into_native(self, color: Option<i32>) -> NativeCalendarOptions {
        NativeCalendarOptions {
            title: self.title,
            name: self.name,
            color,
            access_level: self.access_level,
            owner_account: self.owner_account,
            source: self.source,
        }
    }
}

/// Calendar options as forwarded to a provider.
///
/// `color` holds the native ARGB value and is left out entirely when absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct NativeCalendarOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_account: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<CalendarSource>,
}

/// A date given either as text or as epoch milliseconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DateInput {
    Millis(i64),
    Text(String),
}

impl From<DateTime<Utc>> for DateInput {
    fn from(value: DateTime<Utc>) -> Self {
        DateInput::Millis(value.timestamp_millis())
    }
}

impl From<&str> for DateInput {
    fn from(value: &str) -> Self {
        DateInput::Text(value.to_string())
    }
}

/// Structured recurrence description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct RecurrenceRule {
    pub frequency: Option<String>,
    pub interval: Option<u32>,
    pub duration: Option<String>,
    pub occurrence: Option<u32>,
    pub end_date: Option<DateInput>,
    pub days_of_week: Option<Vec<String>>,
    pub days_of_month: Option<Vec<u32>>,
    pub week_start: Option<String>,
    pub week_position_in_month: Option<i32>,
}

/// Alarm attached to an event; `date` is an absolute date or an offset in minutes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alarm {
    pub date: DateInput,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Attendee {
    pub name: Option<String>,
    pub email: String,
}

/// Event ids arrive either as strings or as bare numbers
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Number(i64),
    }

    Ok(Option::<Id>::deserialize(deserializer)?.map(|id| match id {
        Id::Text(text) => text,
        Id::Number(number) => number.to_string(),
    }))
}

/// Event fields supplied when saving or updating
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct EventDetails {
    #[serde(default, alias = "eventId", deserialize_with = "string_or_number")]
    pub id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub start_date: Option<DateInput>,
    pub end_date: Option<DateInput>,
    pub recurrence: Option<String>,
    pub recurrence_rule: Option<RecurrenceRule>,
    pub all_day: Option<bool>,
    pub time_zone: Option<String>,
    pub end_time_zone: Option<String>,
    pub alarms: Option<Vec<Alarm>>,
    pub attendees: Option<Vec<Attendee>>,
    pub availability: Option<String>,
    pub calendar_id: Option<String>,
    /// Interpret text dates in the default zone instead of UTC
    #[serde(alias = "skipAndroidTimezone")]
    pub skip_time_zone: Option<bool>,
}

/// An event as reported by a provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: String,
    pub calendar_id: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub all_day: bool,
    pub time_zone: String,
    pub end_time_zone: String,
    pub recurrence_rule: Option<String>,
    pub duration: Option<String>,
    pub availability: Availability,
    pub has_alarm: bool,
    #[serde(default)]
    pub alarms: Vec<Alarm>,
    #[serde(default)]
    pub attendees: Vec<Attendee>,
}

/// Per-call options for event writes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct EventOptions {
    /// Apply edits to every instance of a recurring event
    pub sync: bool,
}

impl EventOptions {
    pub fn synced() -> Self {
        Self { sync: true }
    }
}

/// Criteria for updating or removing events without knowing their ids
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct EventSelector {
    #[serde(default, deserialize_with = "string_or_number")]
    pub event_id: Option<String>,
    pub title: Option<String>,
    pub location: Option<String>,
    pub calendar_id: Option<String>,
}

impl From<&EventDetails> for EventSelector {
    fn from(details: &EventDetails) -> Self {
        Self {
            event_id: details.id.clone(),
            title: details.title.clone(),
            location: details.location.clone(),
            calendar_id: details.calendar_id.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_id_accepts_numbers() {
        let detail: EventDetails =
            serde_json::from_str(r#"{"eventId": 7, "title": "Moved"}"#).unwrap();
        assert_eq!(detail.id.as_deref(), Some("7"));

        let detail: EventDetails = serde_json::from_str(r#"{"id": "8"}"#).unwrap();
        assert_eq!(detail.id.as_deref(), Some("8"));

        let detail: EventDetails = serde_json::from_str(r#"{"title": "New"}"#).unwrap();
        assert!(detail.id.is_none());

        let selector: EventSelector = serde_json::from_str(r#"{"eventId": 3}"#).unwrap();
        assert_eq!(selector.event_id.as_deref(), Some("3"));
    }

    #[test]
    fn test_availability_store_list() {
        let parsed = Availability::parse_store_list("0,AVAILABILITY_FREE,2,bogus");
        assert_eq!(
            parsed,
            vec![Availability::Busy, Availability::Free, Availability::Tentative]
        );
    }

    #[test]
    fn test_access_level_codes() {
        assert_eq!(AccessLevel::from_name("owner").code(), 700);
        assert_eq!(AccessLevel::from_name("nonsense"), AccessLevel::None);
        assert!(AccessLevel::Editor.allows_modifications());
        assert!(!AccessLevel::Read.allows_modifications());
    }

    #[test]
    fn test_event_details_accept_legacy_keys() {
        let details: EventDetails = serde_json::from_str(
            r#"{"eventId": "7", "title": "Standup", "startDate": 1700000000000, "skipAndroidTimezone": true}"#,
        )
        .unwrap();
        assert_eq!(details.id.as_deref(), Some("7"));
        assert_eq!(details.start_date, Some(DateInput::Millis(1_700_000_000_000)));
        assert_eq!(details.skip_time_zone, Some(true));
    }

    #[test]
    fn test_event_options_default_to_unsynced() {
        let options: EventOptions = serde_json::from_str("{}").unwrap();
        assert!(!options.sync);
    }
}
