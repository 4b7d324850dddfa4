use crate::models::DateInput;
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;

/// Date format used by calendar bridges, `2024-03-01T09:30:00.000Z`
pub const BRIDGE_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// Date-time format of the RRULE `UNTIL` part
pub const RRULE_UNTIL_FORMAT: &str = "%Y%m%dT%H%M%SZ";

/// Resolve a caller-supplied date.
///
/// Text dates use the bridge format and are read as UTC unless
/// `local_zone` is given, in which case the wall-clock time is taken in that
/// zone. RFC 3339 text is accepted as a fallback. Numbers are epoch
/// milliseconds.
pub fn resolve_date(input: &DateInput, local_zone: Option<Tz>) -> Option<DateTime<Utc>> {
    match input {
        DateInput::Millis(millis) => Utc.timestamp_millis_opt(*millis).single(),
        DateInput::Text(text) => {
            if let Ok(naive) = NaiveDateTime::parse_from_str(text, BRIDGE_DATE_FORMAT) {
                return match local_zone {
                    Some(zone) => zone
                        .from_local_datetime(&naive)
                        .earliest()
                        .map(|dt| dt.with_timezone(&Utc)),
                    None => Some(Utc.from_utc_datetime(&naive)),
                };
            }
            DateTime::parse_from_rfc3339(text)
                .ok()
                .map(|dt| dt.with_timezone(&Utc))
        }
    }
}

/// Format a date in the bridge format
pub fn format_bridge_date(date: &DateTime<Utc>) -> String {
    date.format(BRIDGE_DATE_FORMAT).to_string()
}

/// Format a date for the RRULE `UNTIL` part
pub fn format_rrule_until(date: &DateTime<Utc>) -> String {
    date.format(RRULE_UNTIL_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_bridge_format_as_utc() {
        let date = resolve_date(&DateInput::from("2024-03-01T09:30:00.000Z"), None).unwrap();
        assert_eq!(date, Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap());
    }

    #[test]
    fn test_resolve_bridge_format_in_local_zone() {
        let date = resolve_date(
            &DateInput::from("2024-03-01T09:30:00.000Z"),
            Some(chrono_tz::Europe::Helsinki),
        )
        .unwrap();
        // Helsinki is UTC+2 in March
        assert_eq!(date, Utc.with_ymd_and_hms(2024, 3, 1, 7, 30, 0).unwrap());
    }

    #[test]
    fn test_resolve_millis_and_rfc3339() {
        let millis = resolve_date(&DateInput::Millis(0), None).unwrap();
        assert_eq!(millis, Utc.with_ymd_and_hms(1970, 1, 1, 0, 0, 0).unwrap());

        let rfc = resolve_date(&DateInput::from("2024-03-01T10:00:00+01:00"), None).unwrap();
        assert_eq!(rfc, Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap());

        assert!(resolve_date(&DateInput::from("next tuesday"), None).is_none());
    }

    #[test]
    fn test_formats() {
        let date = Utc.with_ymd_and_hms(2024, 12, 31, 23, 5, 9).unwrap();
        assert_eq!(format_bridge_date(&date), "2024-12-31T23:05:09.000Z");
        assert_eq!(format_rrule_until(&date), "20241231T230509Z");
    }
}
