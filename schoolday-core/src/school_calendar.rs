//! One school year with its breaks, bell schedules and overrides.

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime};
use chrono_tz::Tz;
use serde::Serialize;

use crate::calendar_range::CalendarRange;
use crate::classify::{DayClassification, classify};
use crate::date::{days_inclusive, local_now};
use crate::marking_period::{self, EarlyRelease, MarkingPeriod, MarkingPeriodProgress};
use crate::non_attendance::{NonAttendanceEntry, NonAttendanceMap, NonAttendanceRun};
use crate::overrides::OverrideStore;
use crate::period::{PeriodStatus, track};
use crate::remaining::{RemainingTime, remaining};
use crate::resolver::{ResolvedSchedule, ScheduleResolver};

/// One row of a day-by-day listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayRecord {
    pub date: NaiveDate,
    pub classification: DayClassification,
    /// Schedule name; only resolved for school days.
    pub schedule: Option<String>,
    pub early_release: bool,
}

/// Everything the dashboard shows, derived from a single clock reading.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSnapshot {
    pub name: String,
    pub now: NaiveDateTime,
    pub today: NaiveDate,
    pub range: CalendarRange,
    pub classification: DayClassification,
    pub remaining: RemainingTime,
    /// Today's schedule, present on school days only.
    pub schedule: Option<ResolvedSchedule>,
    pub periods: PeriodStatus,
    pub next_non_attendance: Option<NonAttendanceRun>,
    pub marking_period: Option<MarkingPeriodProgress>,
    pub early_release: Option<EarlyRelease>,
}

pub struct SchoolCalendar {
    name: String,
    timezone: Tz,
    range: CalendarRange,
    entries: Vec<NonAttendanceEntry>,
    non_attendance: NonAttendanceMap,
    resolver: ScheduleResolver,
    overrides: Box<dyn OverrideStore>,
    marking_periods: Vec<MarkingPeriod>,
    early_release: BTreeMap<NaiveDate, EarlyRelease>,
}

impl SchoolCalendar {
    pub fn new(
        range: CalendarRange,
        entries: Vec<NonAttendanceEntry>,
        resolver: ScheduleResolver,
        overrides: Box<dyn OverrideStore>,
    ) -> Self {
        let non_attendance = NonAttendanceMap::build(&entries);
        SchoolCalendar {
            name: String::new(),
            timezone: Tz::UTC,
            range,
            entries,
            non_attendance,
            resolver,
            overrides,
            marking_periods: Vec::new(),
            early_release: BTreeMap::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_timezone(mut self, timezone: Tz) -> Self {
        self.timezone = timezone;
        self
    }

    pub fn with_marking_periods(mut self, periods: Vec<MarkingPeriod>) -> Self {
        self.marking_periods = periods;
        self
    }

    /// Later entries for the same date replace earlier ones.
    pub fn with_early_release(mut self, days: impl IntoIterator<Item = EarlyRelease>) -> Self {
        self.early_release = days.into_iter().map(|d| (d.date, d)).collect();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    pub fn range(&self) -> &CalendarRange {
        &self.range
    }

    pub fn entries(&self) -> &[NonAttendanceEntry] {
        &self.entries
    }

    pub fn resolver(&self) -> &ScheduleResolver {
        &self.resolver
    }

    pub fn marking_periods(&self) -> &[MarkingPeriod] {
        &self.marking_periods
    }

    pub fn overrides(&self) -> &dyn OverrideStore {
        self.overrides.as_ref()
    }

    pub fn overrides_mut(&mut self) -> &mut dyn OverrideStore {
        self.overrides.as_mut()
    }

    /// Wall-clock time in the school's zone.
    pub fn now(&self) -> NaiveDateTime {
        local_now(&self.timezone)
    }

    pub fn classify_day(&self, date: NaiveDate) -> DayClassification {
        classify(date, &self.range, &self.non_attendance)
    }

    pub fn resolve_schedule(&self, date: NaiveDate) -> ResolvedSchedule {
        self.resolver.resolve(date, self.overrides.as_ref())
    }

    pub fn compute_remaining(&self, from: NaiveDate) -> RemainingTime {
        remaining(from, &self.range, &self.non_attendance)
    }

    /// Period status for an already resolved schedule. Days that are not
    /// school days report no current period and nothing remaining.
    pub fn compute_current_period(&self, schedule: &ResolvedSchedule, now: NaiveDateTime) -> PeriodStatus {
        if !self.classify_day(schedule.date).is_school_day() {
            return PeriodStatus::idle();
        }
        track(schedule, now)
    }

    /// Period status at `now`, resolving the schedule only on school days.
    pub fn period_status_at(&self, now: NaiveDateTime) -> PeriodStatus {
        crate::period::track_day(&self.classify_day(now.date()), now, || {
            self.resolve_schedule(now.date())
        })
    }

    /// The next break on or after `from`, within the school year.
    pub fn next_non_attendance(&self, from: NaiveDate) -> Option<NonAttendanceRun> {
        self.non_attendance
            .next_run(from.max(self.range.start()), self.range.end())
    }

    /// Every marking period measured from `today`, in configured order.
    pub fn marking_period_progress(&self, today: NaiveDate) -> Vec<MarkingPeriodProgress> {
        self.marking_periods
            .iter()
            .map(|p| marking_period::progress(p, today, &self.range, &self.non_attendance))
            .collect()
    }

    pub fn current_marking_period(&self, today: NaiveDate) -> Option<MarkingPeriodProgress> {
        marking_period::current(&self.marking_periods, today)
            .map(|p| marking_period::progress(p, today, &self.range, &self.non_attendance))
    }

    pub fn early_release(&self, date: NaiveDate) -> Option<&EarlyRelease> {
        self.early_release.get(&date)
    }

    /// Day-by-day listing over `[from, to]`.
    pub fn days(&self, from: NaiveDate, to: NaiveDate) -> Vec<DayRecord> {
        days_inclusive(from, to)
            .map(|date| {
                let classification = self.classify_day(date);
                let schedule = classification
                    .is_school_day()
                    .then(|| self.resolve_schedule(date).name);
                DayRecord {
                    date,
                    classification,
                    schedule,
                    early_release: self.early_release.contains_key(&date),
                }
            })
            .collect()
    }

    pub fn snapshot(&self, now: NaiveDateTime) -> DashboardSnapshot {
        let today = now.date();
        let classification = self.classify_day(today);

        let schedule = classification
            .is_school_day()
            .then(|| self.resolve_schedule(today));
        let periods = schedule
            .as_ref()
            .map(|s| track(s, now))
            .unwrap_or_else(PeriodStatus::idle);

        DashboardSnapshot {
            name: self.name.clone(),
            now,
            today,
            range: self.range,
            classification,
            remaining: self.compute_remaining(today),
            schedule,
            periods,
            next_non_attendance: self.next_non_attendance(today),
            marking_period: self.current_marking_period(today),
            early_release: self.early_release(today).cloned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overrides::{MemoryOverrideStore, ScheduleOverride};
    use crate::schedule::{Period, Schedule, ScheduleCatalog};
    use chrono::{NaiveTime, Weekday};
    use std::collections::BTreeMap;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn calendar() -> SchoolCalendar {
        let catalog = ScheduleCatalog::new(
            vec![
                Schedule::new(
                    "DEFAULT",
                    vec![
                        Period::new("01", "Period 01", t(8, 10), t(8, 52)),
                        Period::new("02", "Period 02", t(8, 57), t(9, 39)),
                    ],
                ),
                Schedule::new("WED_LATE", vec![Period::new("01", "Period 01", t(9, 40), t(10, 14))]),
            ],
            "DEFAULT",
        )
        .unwrap();
        let resolver = ScheduleResolver::standard(
            catalog,
            BTreeMap::new(),
            vec![],
            vec![(Weekday::Wed, "WED_LATE".to_string())],
        );
        let range = CalendarRange::new(date(2025, 8, 12), date(2025, 9, 30)).unwrap();
        let entries = vec![NonAttendanceEntry::single("Labor Day", date(2025, 9, 1))];

        SchoolCalendar::new(range, entries, resolver, Box::new(MemoryOverrideStore::new()))
            .with_name("Test School")
    }

    #[test]
    fn test_compute_current_period_is_zeroed_on_holidays() {
        let cal = calendar();
        let labor_day = date(2025, 9, 1);
        let schedule = cal.resolve_schedule(labor_day);
        assert_eq!(schedule.periods.len(), 2);

        let status = cal.compute_current_period(&schedule, labor_day.and_time(t(8, 30)));
        assert_eq!(status, PeriodStatus::idle());
    }

    #[test]
    fn test_period_status_at_on_school_day() {
        let cal = calendar();
        let status = cal.period_status_at(date(2025, 9, 2).and_time(t(8, 30)));
        assert_eq!(status.current_period_index, Some(0));
        assert_eq!(status.remaining_periods, 2);
    }

    #[test]
    fn test_overrides_are_visible_to_resolution() {
        let mut cal = calendar();
        let wed = date(2025, 9, 3);
        assert_eq!(cal.resolve_schedule(wed).name, "WED_LATE");

        cal.overrides_mut()
            .set(wed, ScheduleOverride::Named("DEFAULT".into()))
            .unwrap();
        assert_eq!(cal.resolve_schedule(wed).name, "DEFAULT");

        cal.overrides_mut().remove(wed).unwrap();
        assert_eq!(cal.resolve_schedule(wed).name, "WED_LATE");
    }

    #[test]
    fn test_next_non_attendance_clamps_to_school_year() {
        let cal = calendar();
        let run = cal.next_non_attendance(date(2025, 1, 1)).unwrap();
        assert_eq!(run.label, "Labor Day");
        assert!(run.is_single_day());
        assert_eq!(cal.next_non_attendance(date(2025, 9, 2)), None);
    }

    #[test]
    fn test_days_only_resolve_school_days() {
        let cal = calendar();
        let days = cal.days(date(2025, 8, 30), date(2025, 9, 3));
        let schedules: Vec<_> = days.iter().map(|d| d.schedule.as_deref()).collect();
        assert_eq!(
            schedules,
            vec![None, None, None, Some("DEFAULT"), Some("WED_LATE")]
        );
        assert_eq!(days[2].classification, DayClassification::Holiday("Labor Day".into()));
    }

    #[test]
    fn test_snapshot_uses_one_reading() {
        let cal = calendar();
        let now = date(2025, 9, 2).and_time(t(9, 0));
        let snap = cal.snapshot(now);

        assert_eq!(snap.name, "Test School");
        assert_eq!(snap.today, date(2025, 9, 2));
        assert!(snap.classification.is_school_day());
        assert_eq!(snap.periods.current_period_index, Some(1));
        assert_eq!(snap.remaining, cal.compute_remaining(snap.today));
        assert_eq!(snap.schedule.map(|s| s.name), Some("DEFAULT".to_string()));
        assert_eq!(snap.next_non_attendance, None);
    }

    #[test]
    fn test_marking_period_and_early_release_in_snapshot() {
        let cal = calendar()
            .with_marking_periods(vec![
                MarkingPeriod::new("Progress Report 1", date(2025, 8, 12), date(2025, 9, 12)).unwrap(),
                MarkingPeriod::new("Quarter 1", date(2025, 9, 15), date(2025, 9, 30)).unwrap(),
            ])
            .with_early_release([EarlyRelease {
                date: date(2025, 9, 2),
                title: Some("Staff development".into()),
                dismissal: Some(t(12, 30)),
            }]);

        let snap = cal.snapshot(date(2025, 9, 2).and_time(t(9, 0)));
        let mp = snap.marking_period.unwrap();
        assert_eq!(mp.period.title, "Progress Report 1");
        // Sep 3-5 and Sep 8-12.
        assert_eq!(mp.school_days_remaining, 8);
        assert_eq!(snap.early_release.and_then(|e| e.dismissal), Some(t(12, 30)));
        // Early release keeps the normal schedule.
        assert_eq!(snap.schedule.map(|s| s.name), Some("DEFAULT".to_string()));

        let days = cal.days(date(2025, 9, 2), date(2025, 9, 3));
        assert!(days[0].early_release);
        assert!(!days[1].early_release);

        let all = cal.marking_period_progress(date(2025, 9, 2));
        assert_eq!(all.len(), 2);
        assert_eq!(all[1].school_days, 12);
        assert_eq!(cal.current_marking_period(date(2025, 9, 13)), None);
    }

    #[test]
    fn test_snapshot_on_weekend_has_no_schedule() {
        let cal = calendar();
        let snap = cal.snapshot(date(2025, 8, 30).and_time(t(9, 0)));
        assert_eq!(snap.classification, DayClassification::Weekend);
        assert_eq!(snap.schedule, None);
        assert_eq!(snap.periods, PeriodStatus::idle());
        assert_eq!(snap.next_non_attendance.map(|r| r.label), Some("Labor Day".to_string()));
    }
}
