//! Wall-clock timestamps for entry rows.

use chrono::{DateTime, Local, NaiveDateTime, TimeZone};

/// Format used for every `timestamp` cell in the entry tables.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Current local time, formatted as `YYYY-MM-DD HH:MM:SS`.
pub fn now_formatted() -> String {
    format(&Local::now())
}

pub fn format<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    at.format(TIMESTAMP_FORMAT).to_string()
}

/// Parse a stored timestamp cell. Returns `None` for anything not in [`TIMESTAMP_FORMAT`].
pub fn parse(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value.trim(), TIMESTAMP_FORMAT).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Timelike, Utc};

    #[test]
    fn test_format_shape() {
        let at = Utc.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap();
        assert_eq!(format(&at), "2024-03-09 07:05:01");
    }

    #[test]
    fn test_now_parses_back() {
        let stamp = now_formatted();
        let parsed = parse(&stamp).expect("now_formatted must round-trip");
        assert!(parsed.second() < 60);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse("yesterday").is_none());
        assert!(parse("2024-03-09T07:05:01Z").is_none());
    }
}
