//! Local calendar dates and their wire format.
//!
//! Every date in the engine is a `NaiveDate`: year, month and day with no
//! time or zone attached. Strings are parsed straight into that form and
//! never pass through an instant, so "2025-12-02" is Dec 2 in every zone.

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Utc, Weekday};
use chrono_tz::Tz;

use crate::error::{SchoolDayError, SchoolDayResult};

/// Wire format for date-only values.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a `YYYY-MM-DD` string as a calendar date.
pub fn parse_date(s: &str) -> SchoolDayResult<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
        .map_err(|_| SchoolDayError::InvalidDate(s.to_string()))
}

/// Format a date as its `YYYY-MM-DD` key.
pub fn date_key(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Parse a wall-clock time, `HH:MM` with optional `:SS`.
pub fn parse_clock(s: &str) -> SchoolDayResult<NaiveTime> {
    let s = s.trim();
    NaiveTime::parse_from_str(s, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
        .map_err(|_| SchoolDayError::InvalidTime(s.to_string()))
}

/// Format a clock time as `HH:MM`, keeping seconds only when present.
pub fn format_clock(time: NaiveTime) -> String {
    if time.second() == 0 {
        time.format("%H:%M").to_string()
    } else {
        time.format("%H:%M:%S").to_string()
    }
}

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// All dates in `[start, end]`, in order. Empty when `start > end`.
pub fn days_inclusive(start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    start.iter_days().take_while(move |d| *d <= end)
}

/// Number of dates in `[start, end]`, 0 when `start > end`.
pub fn count_days_inclusive(start: NaiveDate, end: NaiveDate) -> u32 {
    if start > end {
        0
    } else {
        ((end - start).num_days() + 1) as u32
    }
}

/// Current wall-clock time in the school's zone.
///
/// This is the one place a real instant is turned into local calendar
/// terms; everything downstream works on the returned value.
pub fn local_now(tz: &Tz) -> NaiveDateTime {
    Utc::now().with_timezone(tz).naive_local()
}

/// Parse an IANA zone name such as `America/Chicago`.
pub fn parse_timezone(name: &str) -> SchoolDayResult<Tz> {
    name.parse::<Tz>()
        .map_err(|e| SchoolDayError::Config(format!("Unknown time zone '{}': {}", name, e)))
}

/// The zone the host is configured for.
pub fn system_timezone() -> SchoolDayResult<Tz> {
    let name = iana_time_zone::get_timezone()
        .map_err(|e| SchoolDayError::Config(format!("Could not detect system time zone: {}", e)))?;
    parse_timezone(&name)
}

/// Serde adapter for `HH:MM` clock times.
pub mod clock {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_clock(*time))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let s = String::deserialize(deserializer)?;
        super::parse_clock(&s).map_err(serde::de::Error::custom)
    }
}
