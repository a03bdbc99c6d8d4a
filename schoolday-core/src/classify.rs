//! Day classification.

use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;

use crate::calendar_range::CalendarRange;
use crate::date::is_weekend;
use crate::non_attendance::NonAttendanceMap;

/// What kind of day a date is, relative to a school year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "label", rename_all = "snake_case")]
pub enum DayClassification {
    SchoolDay,
    Weekend,
    /// A non-attendance day, carrying the entry's label.
    Holiday(String),
    NotStarted,
    Completed,
}

impl DayClassification {
    pub fn is_school_day(&self) -> bool {
        matches!(self, DayClassification::SchoolDay)
    }

    pub fn holiday_label(&self) -> Option<&str> {
        match self {
            DayClassification::Holiday(label) => Some(label),
            _ => None,
        }
    }
}

impl fmt::Display for DayClassification {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DayClassification::SchoolDay => write!(f, "School day"),
            DayClassification::Weekend => write!(f, "No school: Weekend"),
            DayClassification::Holiday(label) => write!(f, "No school: {}", label),
            DayClassification::NotStarted => write!(f, "Not started"),
            DayClassification::Completed => write!(f, "Completed"),
        }
    }
}

/// Classify `date` against a school year and its non-attendance map.
///
/// Range checks come first, so a holiday listed outside the school year
/// still reads as `NotStarted` or `Completed`. Holidays beat weekends.
pub fn classify(date: NaiveDate, range: &CalendarRange, non_attendance: &NonAttendanceMap) -> DayClassification {
    if date < range.start() {
        return DayClassification::NotStarted;
    }
    if date > range.end() {
        return DayClassification::Completed;
    }
    if let Some(label) = non_attendance.label_for(date) {
        return DayClassification::Holiday(label.to_string());
    }
    if is_weekend(date) {
        return DayClassification::Weekend;
    }
    DayClassification::SchoolDay
}
