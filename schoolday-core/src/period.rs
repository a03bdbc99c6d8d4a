//! Which period is running and how many are left today.

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::classify::DayClassification;
use crate::resolver::ResolvedSchedule;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct PeriodStatus {
    /// Index into the schedule's periods; `None` before the first period,
    /// between periods, after the last one, and on days without school.
    pub current_period_index: Option<usize>,
    /// Counted periods that have not ended yet.
    pub remaining_periods: usize,
}

impl PeriodStatus {
    /// Status for a day without classes.
    pub fn idle() -> Self {
        Self::default()
    }
}

/// Locate `now` within an anchored schedule.
pub fn track(schedule: &ResolvedSchedule, now: NaiveDateTime) -> PeriodStatus {
    let current_period_index = schedule.periods.iter().position(|p| p.contains(now));
    let remaining_periods = schedule
        .periods
        .iter()
        .filter(|p| p.counts_toward_remaining && now < p.end)
        .count();

    PeriodStatus {
        current_period_index,
        remaining_periods,
    }
}

/// Like [`track`], but only consults the schedule on school days.
///
/// `resolve` is not called for weekends, holidays or dates outside the
/// school year.
pub fn track_day<F>(classification: &DayClassification, now: NaiveDateTime, resolve: F) -> PeriodStatus
where
    F: FnOnce() -> ResolvedSchedule,
{
    if !classification.is_school_day() {
        return PeriodStatus::idle();
    }
    track(&resolve(), now)
}
