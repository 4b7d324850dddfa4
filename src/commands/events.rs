use super::{print_json, CommandResult};
use calendar_events::error::{invalid_input, CalendarResult};
use calendar_events::models::{DateInput, EventDetails, EventOptions, EventSelector};
use calendar_events::utils::time::resolve_date;
use calendar_events::{CalendarClient, CalendarProvider};
use chrono::{DateTime, NaiveDate, Utc};
use clap::{Args, Subcommand};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Subcommand, Debug)]
pub enum EventAction {
    /// List events starting inside a date range
    List {
        /// Range start, a date or an ISO 8601 date-time
        #[arg(long)]
        from: String,
        /// Range end, a date or an ISO 8601 date-time
        #[arg(long)]
        to: String,
        /// Restrict to these calendar ids
        #[arg(long = "calendar")]
        calendars: Vec<String>,
    },
    /// Show one event
    Show { id: String },
    /// Create an event, or update it when `--id` is given
    Add {
        #[command(flatten)]
        fields: EventFields,
        /// Apply an update to every instance of a series
        #[arg(long)]
        sync: bool,
    },
    /// Save events from a JSON file holding one record or a list of them
    Import {
        file: PathBuf,
        #[arg(long)]
        sync: bool,
    },
    /// Update events from a JSON file holding one record
    Update { file: PathBuf },
    /// Remove events by id
    Remove {
        #[arg(required = true)]
        ids: Vec<String>,
        #[arg(long)]
        sync: bool,
    },
    /// Remove every event matching all the given fields
    RemoveMatching {
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        location: Option<String>,
        #[arg(long)]
        calendar: Option<String>,
    },
    /// Open an event in the calendar app
    Open { id: String },
}

/// Event fields given on the command line; unset ones are left out of the record
#[derive(Args, Debug)]
pub struct EventFields {
    #[arg(long)]
    title: String,
    /// Required for new events
    #[arg(long, required_unless_present = "id")]
    start: Option<String>,
    #[arg(long)]
    end: Option<String>,
    /// Update this event instead of creating one
    #[arg(long)]
    id: Option<String>,
    #[arg(long)]
    calendar: Option<String>,
    #[arg(long)]
    location: Option<String>,
    #[arg(long)]
    description: Option<String>,
    /// daily, weekly, monthly or yearly
    #[arg(long)]
    recurrence: Option<String>,
    /// `--all-day` alone means true, `--all-day false` clears it
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    all_day: Option<bool>,
}

impl EventFields {
    /// Split into the title and the detail record for `save_event`
    fn into_details(self) -> CalendarResult<(String, EventDetails)> {
        let date = |text: Option<String>| -> CalendarResult<Option<DateInput>> {
            text.map(|text| Ok(DateInput::Text(parse_bound(&text)?.to_rfc3339())))
                .transpose()
        };

        let details = EventDetails {
            id: self.id,
            description: self.description,
            location: self.location,
            start_date: date(self.start)?,
            end_date: date(self.end)?,
            recurrence: self.recurrence,
            all_day: self.all_day,
            calendar_id: self.calendar,
            ..EventDetails::default()
        };
        Ok((self.title, details))
    }
}

/// An import file holds either one record or a list
#[derive(Deserialize)]
#[serde(untagged)]
enum ImportFile {
    Many(Vec<EventDetails>),
    One(Box<EventDetails>),
}

/// Parse a range bound, plain dates mean midnight UTC
fn parse_bound(text: &str) -> CalendarResult<DateTime<Utc>> {
    if let Some(date) = resolve_date(&DateInput::Text(text.to_string()), None) {
        return Ok(date);
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| invalid_input(&format!("Invalid date: {}", text)))
}

async fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> CalendarResult<T> {
    debug!("Reading {}", path.display());
    let content = tokio::fs::read_to_string(path).await?;
    Ok(serde_json::from_str(&content)?)
}

pub async fn run<P>(action: EventAction, client: &CalendarClient<P>) -> CommandResult
where
    P: CalendarProvider + ?Sized,
{
    match action {
        EventAction::List {
            from,
            to,
            calendars,
        } => {
            let start = parse_bound(&from)?;
            let end = parse_bound(&to)?;
            print_json(&client.fetch_all_events(start, end, &calendars).await?)
        }
        EventAction::Show { id } => print_json(&client.find_event_by_id(&id).await?),
        EventAction::Add { fields, sync } => {
            let (title, details) = fields.into_details()?;
            let id = client
                .save_event(&title, details, EventOptions { sync })
                .await?;
            info!("Saved event {}", id);
            print_json(&id)
        }
        EventAction::Import { file, sync } => match read_json::<ImportFile>(&file).await? {
            ImportFile::Many(details) => {
                print_json(&client.save_events(details, EventOptions { sync }).await?)
            }
            ImportFile::One(detail) => print_json(&client.save_event_detailed(*detail).await?),
        },
        EventAction::Update { file } => {
            let detail = read_json::<EventDetails>(&file).await?;
            print_json(&client.update_event(detail).await?)
        }
        EventAction::Remove { ids, sync } => {
            let options = EventOptions { sync };
            match ids.as_slice() {
                [id] => print_json(&client.remove_event(id, options).await?),
                _ => print_json(&client.remove_events(&ids, options).await?),
            }
        }
        EventAction::RemoveMatching {
            title,
            location,
            calendar,
        } => {
            let selector = EventSelector {
                event_id: None,
                title,
                location,
                calendar_id: calendar,
            };
            print_json(&client.remove_events_matching(selector).await?)
        }
        EventAction::Open { id } => {
            client.open_event_in_calendar(&id);
            Ok(())
        }
    }
}
