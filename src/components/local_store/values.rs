//! Translation of caller-supplied event details into event columns.

use super::models::{StoredEvent, DEFAULT_CALENDAR_ID};
use super::recurrence::{build_rule, RuleParts};
use crate::error::{invalid_input, CalendarResult};
use crate::models::{Alarm, Attendee, Availability, DateInput, EventDetails};
use crate::utils::time::{format_rrule_until, resolve_date};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;

/// Duration recurring events get when their rule names none
const DEFAULT_RECURRENCE_DURATION: &str = "PT1H";

/// Columns present in one detail record; absent ones stay `None`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventValues {
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub dtstart: Option<DateTime<Utc>>,
    pub dtend: Option<DateTime<Utc>>,
    pub rrule: Option<String>,
    pub duration: Option<String>,
    pub all_day: Option<bool>,
    pub time_zone: Option<String>,
    pub end_time_zone: Option<String>,
    pub alarms: Option<Vec<Alarm>>,
    pub attendees: Option<Vec<Attendee>>,
    pub availability: Option<Availability>,
    pub calendar_id: Option<u64>,
}

fn date_column(
    input: Option<&DateInput>,
    local_zone: Option<Tz>,
) -> CalendarResult<Option<DateTime<Utc>>> {
    input
        .map(|date| {
            resolve_date(date, local_zone)
                .ok_or_else(|| invalid_input(&format!("Unparseable date: {:?}", date)))
        })
        .transpose()
}

/// An end, when there is one, may not precede the start
pub fn check_order(dtstart: DateTime<Utc>, dtend: Option<DateTime<Utc>>) -> CalendarResult<()> {
    match dtend {
        Some(end) if end < dtstart => Err(invalid_input("`endDate` is before `startDate`")),
        _ => Ok(()),
    }
}

impl EventValues {
    /// Read the columns out of `details`.
    ///
    /// `default_zone` is used for text dates when the details ask to skip UTC.
    pub fn from_details(details: &EventDetails, default_zone: Tz) -> CalendarResult<Self> {
        let local_zone = details
            .skip_time_zone
            .unwrap_or(false)
            .then_some(default_zone);

        let mut values = EventValues {
            title: details.title.clone(),
            description: details.description.clone(),
            location: details.location.clone(),
            dtstart: date_column(details.start_date.as_ref(), local_zone)?,
            dtend: date_column(details.end_date.as_ref(), local_zone)?,
            all_day: details.all_day,
            time_zone: details.time_zone.clone(),
            end_time_zone: details.end_time_zone.clone(),
            alarms: details.alarms.clone(),
            attendees: details.attendees.clone(),
            availability: details.availability.as_deref().map(Availability::from_name),
            ..EventValues::default()
        };

        if let Some(recurrence) = &details.recurrence {
            values.rrule = build_rule(recurrence, &RuleParts::default());
        }

        if let Some(rule) = &details.recurrence_rule {
            if let Some(frequency) = &rule.frequency {
                let until = date_column(rule.end_date.as_ref(), local_zone)?
                    .map(|date| format_rrule_until(&date));
                let parts = RuleParts {
                    interval: rule.interval,
                    until,
                    occurrence: rule.occurrence,
                    days_of_week: rule.days_of_week.as_deref(),
                    week_start: rule.week_start.as_deref(),
                    week_position_in_month: rule.week_position_in_month,
                    days_of_month: rule.days_of_month.as_deref(),
                };

                values.duration = Some(
                    rule.duration
                        .clone()
                        .unwrap_or_else(|| DEFAULT_RECURRENCE_DURATION.to_string()),
                );
                if let Some(rrule) = build_rule(frequency, &parts) {
                    values.rrule = Some(rrule);
                }
            }
        }

        if let Some(calendar_id) = &details.calendar_id {
            let id = calendar_id
                .parse::<u64>()
                .map_err(|_| invalid_input(&format!("Invalid calendarId: {}", calendar_id)))?;
            values.calendar_id = Some(id);
        }

        Ok(values)
    }

    /// Build a new event row, filling in store defaults
    pub fn into_new_event(self, id: u64, default_zone: Tz) -> CalendarResult<StoredEvent> {
        let dtstart = self
            .dtstart
            .ok_or_else(|| invalid_input("new events require `startDate`"))?;

        if self.dtend.is_none() && self.rrule.is_none() {
            return Err(invalid_input(
                "new events require `endDate` unless they recur",
            ));
        }
        check_order(dtstart, self.dtend)?;

        let zone_name = default_zone.name().to_string();

        Ok(StoredEvent {
            id,
            calendar_id: self.calendar_id.unwrap_or(DEFAULT_CALENDAR_ID),
            title: self.title,
            description: self.description,
            location: self.location,
            dtstart,
            dtend: self.dtend,
            duration: self.duration,
            rrule: self.rrule,
            all_day: self.all_day.unwrap_or(false),
            time_zone: self.time_zone.unwrap_or_else(|| zone_name.clone()),
            end_time_zone: self.end_time_zone.unwrap_or(zone_name),
            has_alarm: self.alarms.is_some(),
            alarms: self.alarms.unwrap_or_default(),
            attendees: self.attendees.unwrap_or_default(),
            availability: self.availability.unwrap_or_default(),
        })
    }

    /// Overwrite the columns present here, leaving the rest of `event` alone
    pub fn apply_to(&self, event: &mut StoredEvent) {
        if let Some(title) = &self.title {
            event.title = Some(title.clone());
        }
        if let Some(description) = &self.description {
            event.description = Some(description.clone());
        }
        if let Some(location) = &self.location {
            event.location = Some(location.clone());
        }
        if let Some(dtstart) = self.dtstart {
            event.dtstart = dtstart;
        }
        if let Some(dtend) = self.dtend {
            event.dtend = Some(dtend);
        }
        if let Some(rrule) = &self.rrule {
            event.rrule = Some(rrule.clone());
        }
        if let Some(duration) = &self.duration {
            event.duration = Some(duration.clone());
        }
        if let Some(all_day) = self.all_day {
            event.all_day = all_day;
        }
        if let Some(time_zone) = &self.time_zone {
            event.time_zone = time_zone.clone();
        }
        if let Some(end_time_zone) = &self.end_time_zone {
            event.end_time_zone = end_time_zone.clone();
        }
        if let Some(alarms) = &self.alarms {
            event.has_alarm = true;
            event.alarms = alarms.clone();
        }
        if let Some(attendees) = &self.attendees {
            event.attendees = attendees.clone();
        }
        if let Some(availability) = self.availability {
            event.availability = availability;
        }
        if let Some(calendar_id) = self.calendar_id {
            event.calendar_id = calendar_id;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RecurrenceRule;
    use chrono::TimeZone;

    fn details() -> EventDetails {
        EventDetails {
            title: Some("Planning".to_string()),
            start_date: Some(DateInput::from("2024-05-06T09:00:00.000Z")),
            end_date: Some(DateInput::from("2024-05-06T10:00:00.000Z")),
            ..EventDetails::default()
        }
    }

    #[test]
    fn test_new_event_defaults() {
        let values = EventValues::from_details(&details(), chrono_tz::Europe::Helsinki).unwrap();
        let event = values.into_new_event(3, chrono_tz::Europe::Helsinki).unwrap();

        assert_eq!(event.calendar_id, DEFAULT_CALENDAR_ID);
        assert_eq!(event.time_zone, "Europe/Helsinki");
        assert_eq!(event.end_time_zone, "Europe/Helsinki");
        assert_eq!(event.availability, Availability::Busy);
        assert!(!event.has_alarm);
        assert_eq!(event.dtstart, Utc.with_ymd_and_hms(2024, 5, 6, 9, 0, 0).unwrap());
    }

    #[test]
    fn test_recurrence_rule_sets_duration_and_until() {
        let mut details = details();
        details.end_date = None;
        details.recurrence_rule = Some(RecurrenceRule {
            frequency: Some("weekly".to_string()),
            end_date: Some(DateInput::from("2024-06-30T00:00:00.000Z")),
            days_of_week: Some(vec!["MO".to_string()]),
            ..RecurrenceRule::default()
        });

        let values = EventValues::from_details(&details, chrono_tz::UTC).unwrap();
        assert_eq!(values.duration.as_deref(), Some("PT1H"));
        assert_eq!(
            values.rrule.as_deref(),
            Some("FREQ=WEEKLY;BYDAY=MO;UNTIL=20240630T000000Z")
        );
        assert!(values.into_new_event(1, chrono_tz::UTC).is_ok());
    }

    #[test]
    fn test_missing_or_bad_dates_rejected() {
        let mut no_end = details();
        no_end.end_date = None;
        let values = EventValues::from_details(&no_end, chrono_tz::UTC).unwrap();
        assert!(values.into_new_event(1, chrono_tz::UTC).is_err());

        let mut garbled = details();
        garbled.start_date = Some(DateInput::from("soon"));
        assert!(EventValues::from_details(&garbled, chrono_tz::UTC).is_err());

        let mut reversed = details();
        reversed.end_date = Some(DateInput::from("2024-05-06T08:00:00.000Z"));
        let values = EventValues::from_details(&reversed, chrono_tz::UTC).unwrap();
        assert!(values.into_new_event(1, chrono_tz::UTC).is_err());
    }

    #[test]
    fn test_apply_only_touches_present_columns() {
        let mut event = EventValues::from_details(&details(), chrono_tz::UTC)
            .unwrap()
            .into_new_event(1, chrono_tz::UTC)
            .unwrap();

        let patch = EventValues {
            location: Some("Room 2".to_string()),
            availability: Some(Availability::Free),
            ..EventValues::default()
        };
        patch.apply_to(&mut event);

        assert_eq!(event.title.as_deref(), Some("Planning"));
        assert_eq!(event.location.as_deref(), Some("Room 2"));
        assert_eq!(event.availability, Availability::Free);
    }
}
