//! Time helpers for XMLTV timestamps and schedule day headers

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use regex::Regex;

/// Parse an XMLTV datetime attribute into UTC
///
/// XMLTV uses `YYYYMMDDHHMMSS` with an optional ` ±HHMM` suffix,
/// e.g. `20250301211000 +0200`. A missing suffix is read as UTC.
pub fn parse_xmltv_datetime(datetime_str: &str) -> Option<DateTime<Utc>> {
    let datetime_str = datetime_str.trim();

    if let Ok(dt) = DateTime::parse_from_str(datetime_str, "%Y%m%d%H%M%S %z") {
        return Some(dt.with_timezone(&Utc));
    }

    let clean = datetime_str
        .split_whitespace()
        .next()
        .unwrap_or(datetime_str);
    let naive = NaiveDateTime::parse_from_str(clean, "%Y%m%d%H%M%S").ok()?;
    Some(Utc.from_utc_datetime(&naive))
}

/// Format a UTC instant as an XMLTV datetime attribute
pub fn format_xmltv_datetime(dt: DateTime<Utc>) -> String {
    dt.format("%Y%m%d%H%M%S +0000").to_string()
}

/// Parse a named timezone like "Europe/Rome"
pub fn parse_timezone(tz_str: &str) -> Result<Tz, String> {
    tz_str
        .parse::<Tz>()
        .map_err(|_| format!("unknown timezone: '{tz_str}'"))
}

/// Parse a schedule day header into a date
///
/// Headers look like `"Saturday 01st March 2025 - Schedule Time UK GMT"`:
/// everything from the first `" - "` on is dropped, the ordinal suffix is
/// stripped, and the remainder is read as `Weekday DD Month YYYY`.
pub fn parse_day_header(header: &str) -> Option<NaiveDate> {
    let date_part = header.split(" - ").next().unwrap_or(header).trim();

    let ordinal_re = Regex::new(r"(\d+)(?:st|nd|rd|th)\b").ok()?;
    let cleaned = ordinal_re.replace_all(date_part, "$1");

    NaiveDate::parse_from_str(cleaned.as_ref(), "%A %d %B %Y").ok()
}

/// Interpret a wall-clock `HH:MM` on a given date in `tz`, returning UTC
///
/// Ambiguous local times (DST transitions) resolve to the earlier instant.
pub fn local_event_time(date: NaiveDate, time_str: &str, tz: Tz) -> Option<DateTime<Utc>> {
    let time = chrono::NaiveTime::parse_from_str(time_str.trim(), "%H:%M").ok()?;
    let naive = date.and_time(time);
    tz.from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}
