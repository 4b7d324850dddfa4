use super::actor::{LocalStoreActor, Reply, StoreCommand, StoreSettings};
use super::models::StoreState;
use super::snapshot;
use crate::config::Config;
use crate::error::{invalid_input, store_error, CalendarResult};
use crate::models::{
    Calendar, Event, EventDetails, EventOptions, EventSelector, NativeCalendarOptions,
    PermissionStatus,
};
use crate::provider::CalendarProvider;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info};
use url::Url;

/// Handle for interacting with the local calendar store actor
#[derive(Clone)]
pub struct LocalStoreHandle {
    command_tx: mpsc::Sender<StoreCommand>,
    content_uri: String,
    launch_calendar_app: bool,
    _actor_task: Arc<JoinHandle<()>>,
}

impl LocalStoreHandle {
    /// Load the snapshot (if any) and spawn the store actor
    pub async fn open(config: &Config) -> CalendarResult<Self> {
        let default_zone = config.default_timezone()?;

        let loaded = match &config.store_path {
            Some(path) => snapshot::load(path).await?,
            None => None,
        };
        let mut state = loaded.unwrap_or_else(StoreState::seeded);
        state.permissions.apply_config(&config.permissions);

        let settings = StoreSettings {
            default_zone,
            prompt: config.permissions.prompt,
            show_rationale: config.permissions.show_rationale,
            snapshot_path: config.store_path.clone(),
        };

        let (mut actor, command_tx) = LocalStoreActor::new(state, settings);

        // Spawn a task to run the actor
        let actor_task = tokio::spawn(async move {
            actor.run().await;
        });

        Ok(Self {
            command_tx,
            content_uri: config.content_uri.clone(),
            launch_calendar_app: config.launch_calendar_app,
            _actor_task: Arc::new(actor_task),
        })
    }

    /// Send a command and wait for the actor's answer
    async fn request<T, F>(&self, command: F) -> CalendarResult<T>
    where
        T: Send,
        F: FnOnce(Reply<T>) -> StoreCommand + Send,
    {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.command_tx
            .send(command(reply_tx))
            .await
            .map_err(|e| store_error(&format!("Actor mailbox error: {}", e)))?;

        reply_rx
            .await
            .map_err(|_| store_error("Response channel closed"))?
    }

    /// Shutdown the actor
    pub async fn shutdown(&self) -> CalendarResult<()> {
        let _ = self.command_tx.send(StoreCommand::Shutdown).await;
        Ok(())
    }

    /// URI the platform would open for an event
    pub fn event_uri(&self, event_id: &str) -> CalendarResult<Url> {
        let mut url = Url::parse(&self.content_uri)
            .map_err(|e| invalid_input(&format!("Invalid content URI {}: {}", self.content_uri, e)))?;
        url.path_segments_mut()
            .map_err(|_| invalid_input("Content URI cannot take an event id"))?
            .push(event_id);
        Ok(url)
    }
}

#[async_trait]
impl CalendarProvider for LocalStoreHandle {
    async fn check_permissions(&self, read_only: bool) -> CalendarResult<PermissionStatus> {
        self.request(|reply| StoreCommand::CheckPermissions { read_only, reply })
            .await
    }

    async fn request_permissions(&self, read_only: bool) -> CalendarResult<PermissionStatus> {
        self.request(|reply| StoreCommand::RequestPermissions { read_only, reply })
            .await
    }

    async fn find_all_events(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        calendars: &[String],
    ) -> CalendarResult<Vec<Event>> {
        let calendars = calendars.to_vec();
        self.request(|reply| StoreCommand::FindAllEvents {
            start,
            end,
            calendars,
            reply,
        })
        .await
    }

    async fn find_calendars(&self) -> CalendarResult<Vec<Calendar>> {
        self.request(StoreCommand::FindCalendars).await
    }

    async fn save_calendar(
        &self,
        options: NativeCalendarOptions,
    ) -> CalendarResult<Option<String>> {
        self.request(|reply| StoreCommand::SaveCalendar(options, reply))
            .await
    }

    async fn find_calendar_id(&self, name: &str) -> CalendarResult<Option<String>> {
        let name = name.to_string();
        self.request(|reply| StoreCommand::FindCalendarId(name, reply))
            .await
    }

    async fn remove_calendar(&self, id: &str) -> CalendarResult<bool> {
        let id = id.to_string();
        self.request(|reply| StoreCommand::RemoveCalendar(id, reply))
            .await
    }

    async fn remove_calendar_by_name(&self, name: &str) -> CalendarResult<u64> {
        let name = name.to_string();
        self.request(|reply| StoreCommand::RemoveCalendarByName(name, reply))
            .await
    }

    async fn find_by_id(&self, id: &str) -> CalendarResult<Option<Event>> {
        let id = id.to_string();
        self.request(|reply| StoreCommand::FindById(id, reply)).await
    }

    async fn save_event(
        &self,
        title: &str,
        details: EventDetails,
        options: EventOptions,
    ) -> CalendarResult<String> {
        let title = Some(title.to_string());
        self.request(|reply| StoreCommand::SaveEvent {
            title,
            details,
            options,
            reply,
        })
        .await
    }

    async fn save_event_detailed(&self, detail: EventDetails) -> CalendarResult<String> {
        self.request(|reply| StoreCommand::SaveEventDetailed(detail, reply))
            .await
    }

    async fn save_events(
        &self,
        details: Vec<EventDetails>,
        options: EventOptions,
    ) -> CalendarResult<u64> {
        // Inserts never touch existing series, so `sync` has nothing to act on
        debug!("Saving {} events (sync: {})", details.len(), options.sync);
        self.request(|reply| StoreCommand::SaveEvents(details, reply))
            .await
    }

    async fn update_event(&self, detail: EventDetails) -> CalendarResult<u64> {
        self.request(|reply| StoreCommand::UpdateEvent(detail, reply))
            .await
    }

    async fn remove_event(&self, id: &str, options: EventOptions) -> CalendarResult<bool> {
        let id = id.to_string();
        self.request(|reply| StoreCommand::RemoveEvent { id, options, reply })
            .await
    }

    async fn remove_events(&self, ids: &[String], options: EventOptions) -> CalendarResult<u64> {
        let ids = ids.to_vec();
        self.request(|reply| StoreCommand::RemoveEvents {
            ids,
            options,
            reply,
        })
        .await
    }

    async fn remove_events_matching(&self, selector: EventSelector) -> CalendarResult<u64> {
        self.request(|reply| StoreCommand::RemoveEventsMatching(selector, reply))
            .await
    }

    async fn uri_for_calendar(&self) -> CalendarResult<String> {
        Ok(self.content_uri.clone())
    }

    fn open_event_in_calendar(&self, event_id: &str) -> CalendarResult<()> {
        let url = self.event_uri(event_id)?;
        info!("Opening event {} at {}", event_id, url);

        if self.launch_calendar_app {
            webbrowser::open(url.as_str())?;
        }
        Ok(())
    }
}
