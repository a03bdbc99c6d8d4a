//! School days and calendar days left in the year.

use chrono::NaiveDate;
use serde::Serialize;

use crate::calendar_range::CalendarRange;
use crate::classify::classify;
use crate::date::{count_days_inclusive, days_inclusive};
use crate::non_attendance::NonAttendanceMap;

/// Countdown figures relative to a reference date.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RemainingTime {
    /// School days strictly after the reference date, through the last day.
    pub school_days_remaining: u32,
    /// Calendar days from the reference date through the last day, inclusive.
    pub calendar_days_remaining: u32,
    pub total_school_days: u32,
    /// Share of school days already behind, one decimal.
    pub percent_complete: f64,
    /// Share of school days still ahead, one decimal.
    pub percent_remaining: f64,
}

/// Round half-up to one decimal place.
pub fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0 + 0.5).floor() / 10.0
}

fn percent(part: u32, total: u32) -> f64 {
    if total == 0 {
        return 0.0;
    }
    round_one_decimal(100.0 * f64::from(part) / f64::from(total))
}

/// School days in `[from, to]`; dates outside the year never count.
pub fn count_school_days(
    from: NaiveDate,
    to: NaiveDate,
    range: &CalendarRange,
    non_attendance: &NonAttendanceMap,
) -> u32 {
    days_inclusive(from, to)
        .filter(|d| classify(*d, range, non_attendance).is_school_day())
        .count() as u32
}

/// Every school day of the year.
pub fn total_school_days(range: &CalendarRange, non_attendance: &NonAttendanceMap) -> u32 {
    range
        .days()
        .filter(|d| classify(*d, range, non_attendance).is_school_day())
        .count() as u32
}

/// Countdown from `from`.
///
/// `from` itself never counts as a remaining school day: a day already in
/// progress is not "left". Calendar days do include it.
pub fn remaining(from: NaiveDate, range: &CalendarRange, non_attendance: &NonAttendanceMap) -> RemainingTime {
    let total = total_school_days(range, non_attendance);

    let school_days_remaining = match from.succ_opt() {
        Some(next) => count_school_days(next.max(range.start()), range.end(), range, non_attendance),
        None => 0,
    };
    let calendar_days_remaining = count_days_inclusive(from, range.end());

    RemainingTime {
        school_days_remaining,
        calendar_days_remaining,
        total_school_days: total,
        percent_complete: percent(total.saturating_sub(school_days_remaining), total),
        percent_remaining: percent(school_days_remaining, total),
    }
}
