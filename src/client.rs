use crate::error::{CalendarResult, Error};
use crate::models::{
    Calendar, CalendarOptions, Event, EventDetails, EventOptions, EventSelector, PermissionStatus,
};
use crate::provider::CalendarProvider;
use crate::utils::color::to_native_color;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, warn};

/// Uniform async surface over an injected calendar provider.
///
/// Calls are forwarded as-is; the client keeps no state between them. The
/// exceptions are [`CalendarClient::save_calendar`], which converts the colour
/// and confirms the new calendar exists, and
/// [`CalendarClient::open_event_in_calendar`], which never reports failure.
pub struct CalendarClient<P: CalendarProvider + ?Sized> {
    provider: Arc<P>,
}

impl<P: CalendarProvider + ?Sized> Clone for CalendarClient<P> {
    fn clone(&self) -> Self {
        Self {
            provider: Arc::clone(&self.provider),
        }
    }
}

impl<P: CalendarProvider + ?Sized> CalendarClient<P> {
    /// Create a client over the given provider
    pub fn new(provider: Arc<P>) -> Self {
        Self { provider }
    }

    /// Get the underlying provider
    pub fn provider(&self) -> &Arc<P> {
        &self.provider
    }

    pub async fn check_permissions(&self, read_only: bool) -> CalendarResult<PermissionStatus> {
        self.provider.check_permissions(read_only).await
    }

    pub async fn request_permissions(&self, read_only: bool) -> CalendarResult<PermissionStatus> {
        self.provider.request_permissions(read_only).await
    }

    /// Events in `[start, end)`; an empty `calendars` slice means every calendar
    pub async fn fetch_all_events(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        calendars: &[String],
    ) -> CalendarResult<Vec<Event>> {
        self.provider.find_all_events(start, end, calendars).await
    }

    pub async fn find_calendars(&self) -> CalendarResult<Vec<Calendar>> {
        self.provider.find_calendars().await
    }

    /// Save a calendar and return its id once it shows up in the calendar list
    pub async fn save_calendar(&self, mut options: CalendarOptions) -> CalendarResult<String> {
        let color = match options.color.take().filter(|c| !c.is_empty()) {
            Some(color) => Some(to_native_color(&color)?),
            None => None,
        };

        let calendar_id = self
            .provider
            .save_calendar(options.into_native(color))
            .await?
            .filter(|id| !id.is_empty())
            .ok_or(Error::CalendarSave)?;

        let calendars = self.provider.find_calendars().await?;
        if !calendars.iter().any(|c| c.id == calendar_id) {
            warn!(
                "Provider reported calendar {} as saved but it is not listed",
                calendar_id
            );
            return Err(Error::CalendarSave);
        }

        debug!("Saved calendar {}", calendar_id);
        Ok(calendar_id)
    }

    pub async fn remove_calendar(&self, id: &str) -> CalendarResult<bool> {
        self.provider.remove_calendar(id).await
    }

    pub async fn remove_calendar_by_name(&self, name: &str) -> CalendarResult<u64> {
        self.provider.remove_calendar_by_name(name).await
    }

    pub async fn find_calendar_id(&self, name: &str) -> CalendarResult<Option<String>> {
        self.provider.find_calendar_id(name).await
    }

    pub async fn find_event_by_id(&self, id: &str) -> CalendarResult<Option<Event>> {
        self.provider.find_by_id(id).await
    }

    /// Create or update an event; `options.sync` spreads edits over a recurring series
    pub async fn save_event(
        &self,
        title: &str,
        details: EventDetails,
        options: EventOptions,
    ) -> CalendarResult<String> {
        self.provider.save_event(title, details, options).await
    }

    /// Create an event from one detail record carrying its own title
    pub async fn save_event_detailed(&self, detail: EventDetails) -> CalendarResult<String> {
        self.provider.save_event_detailed(detail).await
    }

    pub async fn save_events(
        &self,
        details: Vec<EventDetails>,
        options: EventOptions,
    ) -> CalendarResult<u64> {
        self.provider.save_events(details, options).await
    }

    pub async fn update_event(&self, detail: EventDetails) -> CalendarResult<u64> {
        self.provider.update_event(detail).await
    }

    pub async fn remove_event(&self, id: &str, options: EventOptions) -> CalendarResult<bool> {
        self.provider.remove_event(id, options).await
    }

    pub async fn remove_events(&self, ids: &[String], options: EventOptions) -> CalendarResult<u64> {
        self.provider.remove_events(ids, options).await
    }

    pub async fn remove_events_matching(&self, selector: EventSelector) -> CalendarResult<u64> {
        self.provider.remove_events_matching(selector).await
    }

    pub async fn uri_for_calendar(&self) -> CalendarResult<String> {
        self.provider.uri_for_calendar().await
    }

    /// Fire-and-forget request to show an event in the calendar UI
    pub fn open_event_in_calendar(&self, event_id: &str) {
        if let Err(e) = self.provider.open_event_in_calendar(event_id) {
            warn!("Could not open event {} in calendar: {}", event_id, e);
        }
    }
}
