use super::models::{StoreState, StoredCalendar, StoredEvent, LOCAL_ACCOUNT_TYPE};
use super::snapshot;
use super::values::{check_order, EventValues};
use crate::config::PromptOutcome;
use crate::error::{provider_error, CalendarResult, Error};
use crate::models::{
    Calendar, Event, EventDetails, EventOptions, EventSelector, NativeCalendarOptions,
    PermissionStatus,
};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use std::path::PathBuf;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info};

/// Reply channel carried by every request
pub type Reply<T> = oneshot::Sender<CalendarResult<T>>;

/// Commands that can be sent to the store actor
pub enum StoreCommand {
    CheckPermissions {
        read_only: bool,
        reply: Reply<PermissionStatus>,
    },
    RequestPermissions {
        read_only: bool,
        reply: Reply<PermissionStatus>,
    },
    FindAllEvents {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        calendars: Vec<String>,
        reply: Reply<Vec<Event>>,
    },
    FindCalendars(Reply<Vec<Calendar>>),
    SaveCalendar(NativeCalendarOptions, Reply<Option<String>>),
    FindCalendarId(String, Reply<Option<String>>),
    RemoveCalendar(String, Reply<bool>),
    RemoveCalendarByName(String, Reply<u64>),
    FindById(String, Reply<Option<Event>>),
    SaveEvent {
        title: Option<String>,
        details: EventDetails,
        options: EventOptions,
        reply: Reply<String>,
    },
    SaveEventDetailed(EventDetails, Reply<String>),
    SaveEvents(Vec<EventDetails>, Reply<u64>),
    UpdateEvent(EventDetails, Reply<u64>),
    RemoveEvent {
        id: String,
        options: EventOptions,
        reply: Reply<bool>,
    },
    RemoveEvents {
        ids: Vec<String>,
        options: EventOptions,
        reply: Reply<u64>,
    },
    RemoveEventsMatching(EventSelector, Reply<u64>),
    Shutdown,
}

/// Fixed behaviour of a running store
#[derive(Debug, Clone)]
pub struct StoreSettings {
    pub default_zone: Tz,
    pub prompt: PromptOutcome,
    pub show_rationale: bool,
    pub snapshot_path: Option<PathBuf>,
}

/// The actor owning the calendar and event tables
pub struct LocalStoreActor {
    state: StoreState,
    settings: StoreSettings,
    command_rx: mpsc::Receiver<StoreCommand>,
}

fn respond<T>(reply: Reply<T>, result: CalendarResult<T>) {
    // The caller may have gone away; nothing to do then
    let _ = reply.send(result);
}

/// Give validation failures the rejection code of the operation
fn rejected(code: &'static str) -> impl Fn(Error) -> Error {
    move |err| match err {
        Error::InvalidInput(message) => provider_error(code, &message),
        other => other,
    }
}

/// Positive numeric event id, anything else selects nothing
fn parse_event_id(id: Option<&str>) -> Option<u64> {
    id.and_then(|id| id.parse::<u64>().ok()).filter(|id| *id > 0)
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

impl LocalStoreActor {
    /// Create a new actor and the sender for its mailbox
    pub fn new(state: StoreState, settings: StoreSettings) -> (Self, mpsc::Sender<StoreCommand>) {
        let (command_tx, command_rx) = mpsc::channel(32);

        let actor = Self {
            state,
            settings,
            command_rx,
        };

        (actor, command_tx)
    }

    /// Start the actor's processing loop
    pub async fn run(&mut self) {
        info!("Local calendar store actor started");

        while let Some(cmd) = self.command_rx.recv().await {
            match cmd {
                StoreCommand::CheckPermissions { read_only, reply } => {
                    let status = self
                        .state
                        .permissions
                        .check(read_only, self.settings.show_rationale);
                    respond(reply, Ok(status));
                }
                StoreCommand::RequestPermissions { read_only, reply } => {
                    let result = self
                        .state
                        .permissions
                        .request(read_only, self.settings.prompt);
                    // The "requested" flag sticks even when the prompt fails
                    self.persist().await;
                    respond(reply, result);
                }
                StoreCommand::FindAllEvents {
                    start,
                    end,
                    calendars,
                    reply,
                } => {
                    respond(reply, self.find_all_events(start, end, &calendars));
                }
                StoreCommand::FindCalendars(reply) => {
                    respond(reply, self.find_calendars());
                }
                StoreCommand::SaveCalendar(options, reply) => {
                    let result = self.save_calendar(options);
                    self.commit(reply, result).await;
                }
                StoreCommand::FindCalendarId(name, reply) => {
                    respond(reply, self.find_calendar_id(&name));
                }
                StoreCommand::RemoveCalendar(id, reply) => {
                    let result = self.remove_calendar(&id);
                    self.commit(reply, result).await;
                }
                StoreCommand::RemoveCalendarByName(name, reply) => {
                    let result = self.remove_calendar_by_name(&name);
                    self.commit(reply, result).await;
                }
                StoreCommand::FindById(id, reply) => {
                    respond(reply, self.find_by_id(&id));
                }
                StoreCommand::SaveEvent {
                    title,
                    details,
                    options,
                    reply,
                } => {
                    let result = self.save_event(title, details, options);
                    self.commit(reply, result).await;
                }
                StoreCommand::SaveEventDetailed(detail, reply) => {
                    let result = self.save_event_detailed(detail);
                    self.commit(reply, result).await;
                }
                StoreCommand::SaveEvents(details, reply) => {
                    let result = self.save_events(details);
                    self.commit(reply, result).await;
                }
                StoreCommand::UpdateEvent(detail, reply) => {
                    let result = self.update_event(detail);
                    self.commit(reply, result).await;
                }
                StoreCommand::RemoveEvent { id, options, reply } => {
                    let result = self.remove_event(&id, options);
                    self.commit(reply, result).await;
                }
                StoreCommand::RemoveEvents {
                    ids,
                    options,
                    reply,
                } => {
                    let result = self.remove_events(&ids, options);
                    self.commit(reply, result).await;
                }
                StoreCommand::RemoveEventsMatching(selector, reply) => {
                    let result = self.remove_events_matching(&selector);
                    self.commit(reply, result).await;
                }
                StoreCommand::Shutdown => {
                    info!("Local calendar store actor shutting down");
                    break;
                }
            }
        }

        info!("Local calendar store actor shut down");
    }

    /// Persist after a successful write, then answer
    async fn commit<T>(&mut self, reply: Reply<T>, result: CalendarResult<T>) {
        if result.is_ok() {
            self.persist().await;
        }
        respond(reply, result);
    }

    async fn persist(&self) {
        if let Some(path) = &self.settings.snapshot_path {
            if let Err(e) = snapshot::save(path, &self.state).await {
                error!("Failed to write calendar snapshot {}: {:?}", path.display(), e);
            }
        }
    }

    fn find_all_events(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        calendars: &[String],
    ) -> CalendarResult<Vec<Event>> {
        self.state.permissions.require(true)?;

        let mut events: Vec<&StoredEvent> = self
            .state
            .events
            .values()
            .filter(|e| e.dtstart >= start && e.dtstart < end)
            .filter(|e| {
                calendars.is_empty() || calendars.iter().any(|c| *c == e.calendar_id.to_string())
            })
            .collect();
        events.sort_by_key(|e| (e.dtstart, e.id));

        debug!(
            "Found {} events between {} and {}",
            events.len(),
            start,
            end
        );
        Ok(events.into_iter().map(StoredEvent::to_event).collect())
    }

    fn find_calendars(&self) -> CalendarResult<Vec<Calendar>> {
        self.state.permissions.require(true)?;
        Ok(self
            .state
            .calendars
            .values()
            .map(StoredCalendar::to_calendar)
            .collect())
    }

    fn save_calendar(&mut self, options: NativeCalendarOptions) -> CalendarResult<Option<String>> {
        self.state.permissions.require(false)?;

        let id = self.state.next_calendar_id;
        let calendar = StoredCalendar::from_options(id, options)?;
        info!("Creating calendar {} ({})", id, calendar.display_name);

        self.state.calendars.insert(id, calendar);
        self.state.next_calendar_id += 1;
        Ok(Some(id.to_string()))
    }

    /// Local-account calendars whose account name is `name`
    fn local_calendars_named(&self, name: &str) -> Vec<u64> {
        self.state
            .calendars
            .values()
            .filter(|c| c.account_name == name && c.account_type == LOCAL_ACCOUNT_TYPE)
            .map(|c| c.id)
            .collect()
    }

    fn find_calendar_id(&self, name: &str) -> CalendarResult<Option<String>> {
        self.state.permissions.require(false)?;
        if name.is_empty() {
            return Ok(None);
        }
        Ok(self
            .local_calendars_named(name)
            .first()
            .map(|id| id.to_string()))
    }

    fn remove_calendar(&mut self, id: &str) -> CalendarResult<bool> {
        self.state.permissions.require(false)?;
        let Ok(id) = id.parse::<u64>() else {
            return Ok(false);
        };
        Ok(self.state.remove_calendars(&[id]) > 0)
    }

    fn remove_calendar_by_name(&mut self, name: &str) -> CalendarResult<u64> {
        self.state.permissions.require(false)?;
        let ids = self.local_calendars_named(name);
        Ok(self.state.remove_calendars(&ids))
    }

    fn find_by_id(&self, id: &str) -> CalendarResult<Option<Event>> {
        self.state.permissions.require(true)?;
        Ok(parse_event_id(Some(id))
            .and_then(|id| self.state.events.get(&id))
            .map(StoredEvent::to_event))
    }

    /// Build a new event row without inserting it
    fn new_event(&self, id: u64, details: &EventDetails) -> CalendarResult<StoredEvent> {
        let zone = self.settings.default_zone;
        let event = EventValues::from_details(details, zone)?.into_new_event(id, zone)?;
        self.ensure_calendar(event.calendar_id)?;
        Ok(event)
    }

    fn ensure_calendar(&self, calendar_id: u64) -> CalendarResult<()> {
        if self.state.calendars.contains_key(&calendar_id) {
            Ok(())
        } else {
            Err(Error::InvalidInput(format!(
                "calendar {} does not exist",
                calendar_id
            )))
        }
    }

    fn insert_event(&mut self, details: &EventDetails) -> CalendarResult<String> {
        let id = self.state.next_event_id;
        let event = self.new_event(id, details)?;
        info!("Creating event {} in calendar {}", id, event.calendar_id);

        self.state.events.insert(id, event);
        self.state.next_event_id += 1;
        Ok(id.to_string())
    }

    fn save_event(
        &mut self,
        title: Option<String>,
        mut details: EventDetails,
        options: EventOptions,
    ) -> CalendarResult<String> {
        self.state.permissions.require(false)?;
        if title.is_some() {
            details.title = title;
        }

        let Some(id) = details.id.as_deref() else {
            return self.insert_event(&details).map_err(rejected("saveEvent error"));
        };

        let event_id = parse_event_id(Some(id))
            .filter(|id| self.state.events.contains_key(id))
            .ok_or_else(|| provider_error("saveEvent error", &format!("event {} not found", id)))?;

        let values = EventValues::from_details(&details, self.settings.default_zone)
            .map_err(rejected("saveEvent error"))?;
        if let Some(calendar_id) = values.calendar_id {
            self.ensure_calendar(calendar_id)
                .map_err(rejected("saveEvent error"))?;
        }

        // A series is stored as one row, so `sync` reaches every instance either way
        debug!("Updating event {} (sync: {})", event_id, options.sync);
        let updated = self
            .updated_rows(&[event_id], &values)
            .map_err(rejected("saveEvent error"))?;
        self.state.events.extend(updated);
        Ok(event_id.to_string())
    }

    fn save_event_detailed(&mut self, detail: EventDetails) -> CalendarResult<String> {
        self.state.permissions.require(false)?;
        self.insert_event(&detail).map_err(rejected("saveEvent error"))
    }

    /// Insert every event or none of them
    fn save_events(&mut self, details: Vec<EventDetails>) -> CalendarResult<u64> {
        self.state.permissions.require(false)?;

        let first_id = self.state.next_event_id;
        let events = details
            .iter()
            .zip(first_id..)
            .map(|(detail, id)| self.new_event(id, detail))
            .collect::<CalendarResult<Vec<_>>>()
            .map_err(rejected("saveEvents error"))?;

        let count = events.len() as u64;
        for event in events {
            self.state.events.insert(event.id, event);
        }
        self.state.next_event_id += count;

        info!("Inserted {} events", count);
        Ok(count)
    }

    /// Ids of the events a selector picks
    fn select(&self, selector: &EventSelector) -> Vec<u64> {
        if let Some(id) = parse_event_id(selector.event_id.as_deref()) {
            return if self.state.events.contains_key(&id) {
                vec![id]
            } else {
                Vec::new()
            };
        }

        let title = non_empty(&selector.title);
        let location = non_empty(&selector.location);
        let calendar_id = non_empty(&selector.calendar_id);
        if title.is_none() && location.is_none() && calendar_id.is_none() {
            return Vec::new();
        }

        let calendar_id = match calendar_id.map(str::parse::<u64>) {
            Some(Ok(id)) => Some(id),
            Some(Err(_)) => return Vec::new(),
            None => None,
        };

        self.state
            .events
            .values()
            .filter(|e| title.map_or(true, |t| e.title.as_deref() == Some(t)))
            .filter(|e| location.map_or(true, |l| e.location.as_deref() == Some(l)))
            .filter(|e| calendar_id.map_or(true, |c| e.calendar_id == c))
            .map(|e| e.id)
            .collect()
    }

    /// The rows `values` would produce, checked before any is stored
    fn updated_rows(
        &self,
        ids: &[u64],
        values: &EventValues,
    ) -> CalendarResult<Vec<(u64, StoredEvent)>> {
        ids.iter()
            .filter_map(|id| self.state.events.get(id))
            .map(|event| {
                let mut event = event.clone();
                values.apply_to(&mut event);
                check_order(event.dtstart, event.dtend)?;
                Ok((event.id, event))
            })
            .collect()
    }

    fn update_event(&mut self, detail: EventDetails) -> CalendarResult<u64> {
        self.state.permissions.require(false)?;

        let values = EventValues::from_details(&detail, self.settings.default_zone)
            .map_err(rejected("updateEvent error"))?;
        if let Some(calendar_id) = values.calendar_id {
            self.ensure_calendar(calendar_id)
                .map_err(rejected("updateEvent error"))?;
        }

        let ids = self.select(&EventSelector::from(&detail));
        let updated = self
            .updated_rows(&ids, &values)
            .map_err(rejected("updateEvent error"))?;
        self.state.events.extend(updated);

        debug!("Updated {} events", ids.len());
        Ok(ids.len() as u64)
    }

    fn remove_event(&mut self, id: &str, options: EventOptions) -> CalendarResult<bool> {
        self.state.permissions.require(false)?;
        debug!("Removing event {} (sync: {})", id, options.sync);
        Ok(parse_event_id(Some(id))
            .and_then(|id| self.state.events.remove(&id))
            .is_some())
    }

    fn remove_events(&mut self, ids: &[String], options: EventOptions) -> CalendarResult<u64> {
        self.state.permissions.require(false)?;
        debug!("Removing {} events (sync: {})", ids.len(), options.sync);
        let removed = ids
            .iter()
            .filter_map(|id| parse_event_id(Some(id)))
            .filter(|id| self.state.events.remove(id).is_some())
            .count();
        Ok(removed as u64)
    }

    fn remove_events_matching(&mut self, selector: &EventSelector) -> CalendarResult<u64> {
        self.state.permissions.require(false)?;
        let ids = self.select(selector);
        for id in &ids {
            self.state.events.remove(id);
        }
        Ok(ids.len() as u64)
    }
}
