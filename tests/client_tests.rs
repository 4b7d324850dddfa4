use async_trait::async_trait;
use calendar_events::error::{provider_error, CalendarResult, Error};
use calendar_events::models::{
    AccessLevel, Calendar, CalendarOptions, Event, EventDetails, EventOptions, EventSelector,
    NativeCalendarOptions, PermissionStatus,
};
use calendar_events::{CalendarClient, CalendarProvider};
use chrono::{DateTime, TimeZone, Utc};
use std::sync::{Arc, Mutex};

/// Provider double that records what the client forwards
#[derive(Default)]
struct StubProvider {
    saved_id: Option<String>,
    calendars: Vec<Calendar>,
    events: Vec<Event>,
    fail_open: bool,
    forwarded: Mutex<Vec<NativeCalendarOptions>>,
    ranges: Mutex<Vec<(DateTime<Utc>, DateTime<Utc>, Vec<String>)>>,
}

impl StubProvider {
    fn forwarded(&self) -> Vec<NativeCalendarOptions> {
        self.forwarded.lock().unwrap().clone()
    }
}

fn calendar(id: &str, title: &str) -> Calendar {
    Calendar {
        id: id.to_string(),
        title: title.to_string(),
        name: Some(title.to_string()),
        color: None,
        source: "local".to_string(),
        source_type: Some("LOCAL".to_string()),
        is_local_account: true,
        access_level: AccessLevel::Owner,
        owner_account: Some("local".to_string()),
        allowed_availabilities: Vec::new(),
        allows_modifications: true,
    }
}

fn unsupported<T>() -> CalendarResult<T> {
    Err(provider_error("stub", "unsupported"))
}

#[async_trait]
impl CalendarProvider for StubProvider {
    async fn check_permissions(&self, read_only: bool) -> CalendarResult<PermissionStatus> {
        Ok(if read_only {
            PermissionStatus::Authorized
        } else {
            PermissionStatus::Undetermined
        })
    }

    async fn request_permissions(&self, _read_only: bool) -> CalendarResult<PermissionStatus> {
        Err(provider_error("permissions - unknown error", "Request was cancelled"))
    }

    async fn find_all_events(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        calendars: &[String],
    ) -> CalendarResult<Vec<Event>> {
        self.ranges
            .lock()
            .unwrap()
            .push((start, end, calendars.to_vec()));
        Ok(self.events.clone())
    }

    async fn find_calendars(&self) -> CalendarResult<Vec<Calendar>> {
        Ok(self.calendars.clone())
    }

    async fn save_calendar(
        &self,
        options: NativeCalendarOptions,
    ) -> CalendarResult<Option<String>> {
        self.forwarded.lock().unwrap().push(options);
        Ok(self.saved_id.clone())
    }

    async fn find_calendar_id(&self, name: &str) -> CalendarResult<Option<String>> {
        Ok(self
            .calendars
            .iter()
            .find(|c| c.name.as_deref() == Some(name))
            .map(|c| c.id.clone()))
    }

    async fn remove_calendar(&self, id: &str) -> CalendarResult<bool> {
        Ok(self.calendars.iter().any(|c| c.id == id))
    }

    async fn remove_calendar_by_name(&self, _name: &str) -> CalendarResult<u64> {
        unsupported()
    }

    async fn find_by_id(&self, id: &str) -> CalendarResult<Option<Event>> {
        Ok(self.events.iter().find(|e| e.id == id).cloned())
    }

    async fn save_event(
        &self,
        title: &str,
        _details: EventDetails,
        options: EventOptions,
    ) -> CalendarResult<String> {
        Ok(format!("{}:{}", title, options.sync))
    }

    async fn save_event_detailed(&self, detail: EventDetails) -> CalendarResult<String> {
        detail
            .title
            .ok_or_else(|| provider_error("saveEvent error", "missing title"))
    }

    async fn save_events(
        &self,
        details: Vec<EventDetails>,
        _options: EventOptions,
    ) -> CalendarResult<u64> {
        Ok(details.len() as u64)
    }

    async fn update_event(&self, _detail: EventDetails) -> CalendarResult<u64> {
        Ok(0)
    }

    async fn remove_event(&self, id: &str, _options: EventOptions) -> CalendarResult<bool> {
        Ok(self.events.iter().any(|e| e.id == id))
    }

    async fn remove_events(&self, ids: &[String], _options: EventOptions) -> CalendarResult<u64> {
        Ok(ids.len() as u64)
    }

    async fn remove_events_matching(&self, _selector: EventSelector) -> CalendarResult<u64> {
        Ok(0)
    }

    async fn uri_for_calendar(&self) -> CalendarResult<String> {
        Ok("content://com.android.calendar/events".to_string())
    }

    fn open_event_in_calendar(&self, _event_id: &str) -> CalendarResult<()> {
        if self.fail_open {
            Err(Error::Other("no calendar app".to_string()))
        } else {
            Ok(())
        }
    }
}

fn stub_client(provider: StubProvider) -> (CalendarClient<StubProvider>, Arc<StubProvider>) {
    let provider = Arc::new(provider);
    (CalendarClient::new(provider.clone()), provider)
}

#[tokio::test]
async fn test_save_calendar_resolves_listed_id() {
    let (client, provider) = stub_client(StubProvider {
        saved_id: Some("cal-1".to_string()),
        calendars: vec![calendar("cal-1", "Work")],
        ..StubProvider::default()
    });

    let options = CalendarOptions {
        title: Some("Work".to_string()),
        ..CalendarOptions::default()
    };
    assert_eq!(client.save_calendar(options).await.unwrap(), "cal-1");

    let forwarded = provider.forwarded();
    assert_eq!(forwarded.len(), 1);
    assert_eq!(forwarded[0].title.as_deref(), Some("Work"));
}

#[tokio::test]
async fn test_save_calendar_converts_color() {
    let (client, provider) = stub_client(StubProvider {
        saved_id: Some("cal-1".to_string()),
        calendars: vec![calendar("cal-1", "Work")],
        ..StubProvider::default()
    });

    let options = CalendarOptions {
        title: Some("Work".to_string()),
        color: Some("#ff0000".to_string()),
        ..CalendarOptions::default()
    };
    client.save_calendar(options).await.unwrap();

    assert_eq!(provider.forwarded()[0].color, Some(-65536));
}

#[tokio::test]
async fn test_save_calendar_without_color_omits_key() {
    let (client, provider) = stub_client(StubProvider {
        saved_id: Some("cal-1".to_string()),
        calendars: vec![calendar("cal-1", "Work")],
        ..StubProvider::default()
    });

    let options = CalendarOptions {
        title: Some("Work".to_string()),
        color: Some(String::new()),
        ..CalendarOptions::default()
    };
    client.save_calendar(options).await.unwrap();

    let forwarded = serde_json::to_value(&provider.forwarded()[0]).unwrap();
    assert!(forwarded.get("color").is_none());
    assert_eq!(forwarded["title"], "Work");
}

#[tokio::test]
async fn test_save_calendar_rejects_unknown_color() {
    let (client, provider) = stub_client(StubProvider {
        saved_id: Some("cal-1".to_string()),
        calendars: vec![calendar("cal-1", "Work")],
        ..StubProvider::default()
    });

    let options = CalendarOptions {
        color: Some("not-a-colour".to_string()),
        ..CalendarOptions::default()
    };
    let err = client.save_calendar(options).await.unwrap_err();

    assert!(matches!(err, Error::InvalidInput(_)));
    assert!(provider.forwarded().is_empty());
}

#[tokio::test]
async fn test_save_calendar_without_id_fails() {
    let (client, _) = stub_client(StubProvider {
        saved_id: None,
        calendars: vec![calendar("cal-1", "Work")],
        ..StubProvider::default()
    });

    let err = client
        .save_calendar(CalendarOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::CalendarSave));
    assert_eq!(err.to_string(), "saveCalendar error");
}

#[tokio::test]
async fn test_save_calendar_unlisted_id_fails() {
    let (client, _) = stub_client(StubProvider {
        saved_id: Some("cal-2".to_string()),
        calendars: Vec::new(),
        ..StubProvider::default()
    });

    let err = client
        .save_calendar(CalendarOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::CalendarSave));
}

#[tokio::test]
async fn test_fetch_all_events_forwards_range() {
    let (client, provider) = stub_client(StubProvider::default());
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let end = Utc.with_ymd_and_hms(2024, 1, 31, 0, 0, 0).unwrap();

    let events = client
        .fetch_all_events(start, end, &["cal-1".to_string()])
        .await
        .unwrap();
    assert!(events.is_empty());

    let ranges = provider.ranges.lock().unwrap();
    assert_eq!(ranges.as_slice(), &[(start, end, vec!["cal-1".to_string()])]);
}

#[tokio::test]
async fn test_provider_results_pass_through() {
    let (client, _) = stub_client(StubProvider {
        calendars: vec![calendar("cal-1", "Work")],
        ..StubProvider::default()
    });

    assert_eq!(
        client.check_permissions(true).await.unwrap(),
        PermissionStatus::Authorized
    );
    assert_eq!(
        client.check_permissions(false).await.unwrap(),
        PermissionStatus::Undetermined
    );
    assert_eq!(
        client.find_calendar_id("Work").await.unwrap().as_deref(),
        Some("cal-1")
    );
    assert!(client.remove_calendar("cal-1").await.unwrap());
    assert_eq!(
        client
            .save_event("Standup", EventDetails::default(), EventOptions::synced())
            .await
            .unwrap(),
        "Standup:true"
    );
    assert_eq!(
        client
            .remove_events(&["1".to_string(), "2".to_string()], EventOptions::default())
            .await
            .unwrap(),
        2
    );
    assert_eq!(
        client.uri_for_calendar().await.unwrap(),
        "content://com.android.calendar/events"
    );
}

#[tokio::test]
async fn test_provider_errors_pass_through() {
    let (client, _) = stub_client(StubProvider::default());

    let err = client.request_permissions(false).await.unwrap_err();
    assert_eq!(err.to_string(), "permissions - unknown error: Request was cancelled");

    let err = client
        .save_event_detailed(EventDetails::default())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Provider { ref code, .. } if code == "saveEvent error"));

    assert!(client.remove_calendar_by_name("Work").await.is_err());
}

#[test]
fn test_open_event_never_fails() {
    let (client, _) = stub_client(StubProvider {
        fail_open: true,
        ..StubProvider::default()
    });
    client.open_event_in_calendar("42");

    let (client, _) = stub_client(StubProvider::default());
    client.open_event_in_calendar("42");
}
