//! Marking periods and early-release days.
//!
//! Both are informational: neither changes how a day is classified or which
//! bell schedule it runs. Marking periods report their own school-day
//! counts so the dashboard can show progress through the current one.

use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;

use crate::calendar_range::CalendarRange;
use crate::error::{SchoolDayError, SchoolDayResult};
use crate::non_attendance::NonAttendanceMap;
use crate::remaining::count_school_days;

/// A grading window such as "Quarter 1" or "Progress Report 2".
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MarkingPeriod {
    pub title: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub note: Option<String>,
}

impl MarkingPeriod {
    pub fn new(title: impl Into<String>, start: NaiveDate, end: NaiveDate) -> SchoolDayResult<Self> {
        let title = title.into();
        if start > end {
            return Err(SchoolDayError::InvalidEntry { label: title, start, end });
        }
        Ok(MarkingPeriod {
            title,
            start,
            end,
            note: None,
        })
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    pub fn status(&self, today: NaiveDate) -> MarkingPeriodStatus {
        if today < self.start {
            MarkingPeriodStatus::Upcoming
        } else if today > self.end {
            MarkingPeriodStatus::Past
        } else {
            MarkingPeriodStatus::Current
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkingPeriodStatus {
    Upcoming,
    Current,
    Past,
}

/// A marking period measured against a reference date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MarkingPeriodProgress {
    #[serde(flatten)]
    pub period: MarkingPeriod,
    pub status: MarkingPeriodStatus,
    /// School days in the whole marking period.
    pub school_days: u32,
    /// School days strictly after `today` through the period's end.
    pub school_days_remaining: u32,
}

/// Measure `period` from `today`. Same convention as the year countdown:
/// `today` itself is not remaining.
pub fn progress(
    period: &MarkingPeriod,
    today: NaiveDate,
    range: &CalendarRange,
    non_attendance: &NonAttendanceMap,
) -> MarkingPeriodProgress {
    let school_days = count_school_days(period.start, period.end, range, non_attendance);
    let school_days_remaining = match today.succ_opt() {
        Some(next) => count_school_days(next.max(period.start), period.end, range, non_attendance),
        None => 0,
    };

    MarkingPeriodProgress {
        period: period.clone(),
        status: period.status(today),
        school_days,
        school_days_remaining,
    }
}

/// The first marking period containing `today`, in configured order.
pub fn current<'a>(periods: &'a [MarkingPeriod], today: NaiveDate) -> Option<&'a MarkingPeriod> {
    periods.iter().find(|p| p.contains(today))
}

/// A day that dismisses early. It runs its normal bell schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EarlyRelease {
    pub date: NaiveDate,
    pub title: Option<String>,
    pub dismissal: Option<NaiveTime>,
}
