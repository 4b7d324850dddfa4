use crate::error::CalendarResult;
use crate::models::{
    Calendar, Event, EventDetails, EventOptions, EventSelector, NativeCalendarOptions,
    PermissionStatus,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Calendar capabilities supplied by the platform (or a stand-in for it).
///
/// Implementations are injected into [`crate::CalendarClient`] and own every
/// storage, ordering and permission decision.
#[async_trait]
pub trait CalendarProvider: Send + Sync {
    /// Current authorization state for read-only or read/write access
    async fn check_permissions(&self, read_only: bool) -> CalendarResult<PermissionStatus>;

    /// Ask for access, prompting the user if needed
    async fn request_permissions(&self, read_only: bool) -> CalendarResult<PermissionStatus>;

    /// Events starting in `[start, end)`, limited to `calendars` unless empty
    async fn find_all_events(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        calendars: &[String],
    ) -> CalendarResult<Vec<Event>>;

    async fn find_calendars(&self) -> CalendarResult<Vec<Calendar>>;

    /// Create a calendar, returning its id if the store produced one
    async fn save_calendar(&self, options: NativeCalendarOptions)
        -> CalendarResult<Option<String>>;

    async fn find_calendar_id(&self, name: &str) -> CalendarResult<Option<String>>;

    async fn remove_calendar(&self, id: &str) -> CalendarResult<bool>;

    /// Remove calendars by account name, returning how many went away
    async fn remove_calendar_by_name(&self, name: &str) -> CalendarResult<u64>;

    async fn find_by_id(&self, id: &str) -> CalendarResult<Option<Event>>;

    /// Create or update (when `details.id` is set) an event with a title
    async fn save_event(
        &self,
        title: &str,
        details: EventDetails,
        options: EventOptions,
    ) -> CalendarResult<String>;

    /// Create an event from a single detail record
    async fn save_event_detailed(&self, detail: EventDetails) -> CalendarResult<String>;

    /// Create several events, returning how many were inserted
    async fn save_events(
        &self,
        details: Vec<EventDetails>,
        options: EventOptions,
    ) -> CalendarResult<u64>;

    /// Update events selected by the detail's id or title/location/calendar
    async fn update_event(&self, detail: EventDetails) -> CalendarResult<u64>;

    async fn remove_event(&self, id: &str, options: EventOptions) -> CalendarResult<bool>;

    async fn remove_events(&self, ids: &[String], options: EventOptions) -> CalendarResult<u64>;

    async fn remove_events_matching(&self, selector: EventSelector) -> CalendarResult<u64>;

    /// Locator of the calendar app or its event table
    async fn uri_for_calendar(&self) -> CalendarResult<String>;

    /// Ask the platform to show the event in its calendar UI
    fn open_event_in_calendar(&self, event_id: &str) -> CalendarResult<()>;
}
