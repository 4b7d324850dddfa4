use super::permissions::PermissionState;
use crate::error::{provider_error, CalendarResult};
use crate::models::{
    AccessLevel, Alarm, Attendee, Availability, Calendar, Event, NativeCalendarOptions,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Account type given to calendars of local accounts
pub const LOCAL_ACCOUNT_TYPE: &str = "LOCAL";

/// Calendar events land in when they name none
pub const DEFAULT_CALENDAR_ID: u64 = 1;

/// Availabilities new calendars allow
const DEFAULT_ALLOWED_AVAILABILITY: &str = "0,1";

const SAVE_CALENDAR_ERROR: &str = "save calendar error";

/// Row of the calendars table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredCalendar {
    pub id: u64,
    pub account_name: String,
    pub account_type: String,
    pub name: String,
    pub display_name: String,
    pub color: i32,
    pub access_level: AccessLevel,
    pub owner_account: String,
    pub allowed_availability: String,
}

impl StoredCalendar {
    /// Validate save options and build a calendar row
    pub fn from_options(id: u64, options: NativeCalendarOptions) -> CalendarResult<Self> {
        let missing = |message: &str| provider_error(SAVE_CALENDAR_ERROR, message);

        let source = options
            .source
            .ok_or_else(|| missing("new calendars require `source` object"))?;
        let name = options
            .name
            .ok_or_else(|| missing("new calendars require `name`"))?;
        let title = options
            .title
            .ok_or_else(|| missing("new calendars require `title`"))?;
        let color = options
            .color
            .ok_or_else(|| missing("new calendars require `color`"))?;
        let access_level = options
            .access_level
            .ok_or_else(|| missing("new calendars require `accessLevel`"))?;
        let owner_account = options
            .owner_account
            .ok_or_else(|| missing("new calendars require `ownerAccount`"))?;

        let account_name = source
            .name
            .ok_or_else(|| missing("new calendars require a `source` object with a `name`"))?;

        let account_type = if source.is_local_account {
            LOCAL_ACCOUNT_TYPE.to_string()
        } else {
            source.source_type.ok_or_else(|| {
                missing("new calendars require a `source` object with a `type`, or `isLocalAccount`: true")
            })?
        };

        Ok(Self {
            id,
            account_name,
            account_type,
            name,
            display_name: title,
            color,
            access_level: AccessLevel::from_name(&access_level),
            owner_account,
            allowed_availability: DEFAULT_ALLOWED_AVAILABILITY.to_string(),
        })
    }

    /// The calendar every fresh store starts with
    pub fn default_local() -> Self {
        Self {
            id: DEFAULT_CALENDAR_ID,
            account_name: "local".to_string(),
            account_type: LOCAL_ACCOUNT_TYPE.to_string(),
            name: "local".to_string(),
            display_name: "Calendar".to_string(),
            // #4285f4
            color: 0xff42_85f4_u32 as i32,
            access_level: AccessLevel::Owner,
            owner_account: "local".to_string(),
            allowed_availability: DEFAULT_ALLOWED_AVAILABILITY.to_string(),
        }
    }

    pub fn is_local(&self) -> bool {
        self.account_type == LOCAL_ACCOUNT_TYPE
    }

    pub fn to_calendar(&self) -> Calendar {
        Calendar {
            id: self.id.to_string(),
            title: self.display_name.clone(),
            name: Some(self.name.clone()),
            color: Some(self.color),
            source: self.account_name.clone(),
            source_type: Some(self.account_type.clone()),
            is_local_account: self.is_local(),
            access_level: self.access_level,
            owner_account: Some(self.owner_account.clone()),
            allowed_availabilities: Availability::parse_store_list(&self.allowed_availability),
            allows_modifications: self.access_level.allows_modifications(),
        }
    }
}

/// Row of the events table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredEvent {
    pub id: u64,
    pub calendar_id: u64,
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub dtstart: DateTime<Utc>,
    pub dtend: Option<DateTime<Utc>>,
    pub duration: Option<String>,
    pub rrule: Option<String>,
    pub all_day: bool,
    pub time_zone: String,
    pub end_time_zone: String,
    pub has_alarm: bool,
    #[serde(default)]
    pub alarms: Vec<Alarm>,
    #[serde(default)]
    pub attendees: Vec<Attendee>,
    pub availability: Availability,
}

impl StoredEvent {
    pub fn to_event(&self) -> Event {
        Event {
            id: self.id.to_string(),
            calendar_id: self.calendar_id.to_string(),
            title: self.title.clone(),
            description: self.description.clone(),
            location: self.location.clone(),
            start_date: self.dtstart,
            end_date: self.dtend,
            all_day: self.all_day,
            time_zone: self.time_zone.clone(),
            end_time_zone: self.end_time_zone.clone(),
            recurrence_rule: self.rrule.clone(),
            duration: self.duration.clone(),
            availability: self.availability,
            has_alarm: self.has_alarm,
            alarms: self.alarms.clone(),
            attendees: self.attendees.clone(),
        }
    }
}

/// Everything the store keeps, also the snapshot file layout
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreState {
    pub calendars: BTreeMap<u64, StoredCalendar>,
    pub events: BTreeMap<u64, StoredEvent>,
    pub next_calendar_id: u64,
    pub next_event_id: u64,
    #[serde(default)]
    pub permissions: PermissionState,
}

impl StoreState {
    /// Fresh state holding only the default local calendar
    pub fn seeded() -> Self {
        let mut calendars = BTreeMap::new();
        calendars.insert(DEFAULT_CALENDAR_ID, StoredCalendar::default_local());

        Self {
            calendars,
            events: BTreeMap::new(),
            next_calendar_id: DEFAULT_CALENDAR_ID + 1,
            next_event_id: 1,
            permissions: PermissionState::default(),
        }
    }

    /// Remove the given calendars and every event in them, returning how many calendars went away
    pub fn remove_calendars(&mut self, ids: &[u64]) -> u64 {
        let mut removed = 0;
        for id in ids {
            if self.calendars.remove(id).is_some() {
                removed += 1;
            }
        }
        self.events.retain(|_, event| !ids.contains(&event.calendar_id));
        removed
    }
}
