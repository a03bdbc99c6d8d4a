use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use schoolday_core::date::days_inclusive;
use schoolday_core::resolver::{ResolveWarning, ScheduleSource};
use schoolday_core::{
    DayClassification, MemoryOverrideStore, SchoolCalendar, SchoolConfig, ScheduleOverride,
};

const SCHOOL_YEAR: &str = include_str!("fixtures/school_year_2025.toml");

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn at(day: NaiveDate, h: u32, m: u32) -> NaiveDateTime {
    day.and_time(NaiveTime::from_hms_opt(h, m, 0).unwrap())
}

fn calendar() -> SchoolCalendar {
    SchoolConfig::from_toml_str(SCHOOL_YEAR)
        .unwrap()
        .build(Box::new(MemoryOverrideStore::new()))
        .unwrap()
}

#[test]
fn test_labor_day_is_a_holiday() {
    let cal = calendar();
    let labor_day = date(2025, 9, 1);
    assert_eq!(labor_day.weekday(), Weekday::Mon);
    assert_eq!(
        cal.classify_day(labor_day),
        DayClassification::Holiday("Labor Day".into())
    );
}

#[test]
fn test_dates_outside_the_year() {
    let cal = calendar();
    // Teacher Institute sits before the first day; range wins.
    assert_eq!(cal.classify_day(date(2025, 8, 11)), DayClassification::NotStarted);
    assert_eq!(cal.classify_day(date(2026, 5, 22)), DayClassification::Completed);
    assert!(cal.classify_day(date(2025, 8, 12)).is_school_day());
    assert!(cal.classify_day(date(2026, 5, 21)).is_school_day());
}

#[test]
fn test_unlisted_weekends_are_weekends() {
    let cal = calendar();
    let range = *cal.range();
    let covered = |day: NaiveDate| cal.entries().iter().any(|e| e.start <= day && day <= e.end);

    for day in days_inclusive(range.start(), range.end()) {
        if !matches!(day.weekday(), Weekday::Sat | Weekday::Sun) {
            continue;
        }
        if covered(day) {
            assert!(cal.classify_day(day).holiday_label().is_some(), "{}", day);
        } else {
            assert_eq!(cal.classify_day(day), DayClassification::Weekend, "{}", day);
        }
    }

    // Saturday inside Winter Break takes the break's label.
    assert_eq!(
        cal.classify_day(date(2025, 12, 27)),
        DayClassification::Holiday("Winter Break".into())
    );
}

#[test]
fn test_break_covers_every_day_in_between() {
    let cal = calendar();
    for day in days_inclusive(date(2025, 12, 22), date(2026, 1, 2)) {
        assert_eq!(cal.classify_day(day).holiday_label(), Some("Winter Break"));
    }
    assert!(cal.classify_day(date(2026, 1, 5)).is_school_day());
}

#[test]
fn test_wednesday_runs_late_start() {
    let cal = calendar();

    // Listed late-start Wednesday.
    let listed = cal.resolve_schedule(date(2025, 9, 3));
    assert_eq!(listed.name, "WED_LATE");
    assert_eq!(
        listed.source,
        ScheduleSource::DateList {
            list: "late-wednesday".into()
        }
    );
    assert_eq!(listed.first_start(), Some(at(date(2025, 9, 3), 9, 40)));

    // Unlisted Wednesday still falls to the weekday rule.
    let unlisted = cal.resolve_schedule(date(2025, 8, 13));
    assert_eq!(unlisted.name, "WED_LATE");
    assert_eq!(unlisted.source, ScheduleSource::Weekday { weekday: Weekday::Wed });
    assert_eq!(unlisted.first_start(), Some(at(date(2025, 8, 13), 9, 40)));
}

#[test]
fn test_late_arrival_list_beats_the_wednesday_list() {
    let cal = calendar();
    let resolved = cal.resolve_schedule(date(2026, 1, 7));
    assert_eq!(resolved.name, "LATE_ARRIVAL_1010");
    assert_eq!(
        resolved.source,
        ScheduleSource::DateList {
            list: "late-arrival".into()
        }
    );

    let friday = cal.resolve_schedule(date(2025, 9, 5));
    assert_eq!(friday.name, "LATE_ARRIVAL_1010");
}

#[test]
fn test_default_override_beats_lists_and_weekday_rule() {
    let mut cal = calendar();
    let day = date(2026, 1, 7);
    cal.overrides_mut()
        .set(day, ScheduleOverride::Named("DEFAULT".into()))
        .unwrap();

    let resolved = cal.resolve_schedule(day);
    assert_eq!(resolved.name, "DEFAULT");
    assert_eq!(resolved.source, ScheduleSource::Override);
    assert!(resolved.warnings.is_empty());
}

#[test]
fn test_resolution_is_idempotent() {
    let cal = calendar();
    for day in [date(2025, 9, 3), date(2025, 9, 5), date(2025, 9, 8), date(2025, 9, 6)] {
        assert_eq!(cal.resolve_schedule(day), cal.resolve_schedule(day));
    }
}

#[test]
fn test_current_period_at_ten() {
    let cal = calendar();
    let monday = date(2025, 9, 8);
    let now = at(monday, 10, 0);

    let schedule = cal.resolve_schedule(monday);
    assert_eq!(schedule.name, "DEFAULT");

    let status = cal.compute_current_period(&schedule, now);
    assert_eq!(status.current_period_index, Some(2));
    // Period 03 through 09; homeroom is not counted.
    assert_eq!(status.remaining_periods, 7);
    assert_eq!(cal.period_status_at(now), status);
}

#[test]
fn test_no_periods_on_holidays() {
    let cal = calendar();
    let status = cal.period_status_at(at(date(2025, 9, 1), 10, 0));
    assert_eq!(status.current_period_index, None);
    assert_eq!(status.remaining_periods, 0);
}

#[test]
fn test_total_school_days_matches_classification() {
    let cal = calendar();
    let range = *cal.range();
    let school_days = cal
        .days(range.start(), range.end())
        .iter()
        .filter(|d| d.classification.is_school_day())
        .count() as u32;

    let remaining = cal.compute_remaining(range.start());
    assert_eq!(school_days, 179);
    assert_eq!(remaining.total_school_days, school_days);
    // The first day itself is not left.
    assert_eq!(remaining.school_days_remaining, school_days - 1);
}

#[test]
fn test_countdown_mid_year() {
    let cal = calendar();

    let r = cal.compute_remaining(date(2025, 9, 8));
    assert_eq!(r.school_days_remaining, 160);
    assert_eq!(r.calendar_days_remaining, 256);
    assert_eq!(r.percent_complete, 10.6);
    assert_eq!(r.percent_remaining, 89.4);

    let r = cal.compute_remaining(date(2025, 12, 19));
    assert_eq!(r.school_days_remaining, 91);
    assert_eq!(r.calendar_days_remaining, 154);
    assert_eq!(r.percent_complete, 49.2);
    assert_eq!(r.percent_remaining, 50.8);
}

#[test]
fn test_countdown_at_and_after_the_end() {
    let cal = calendar();

    let last = cal.compute_remaining(date(2026, 5, 21));
    assert_eq!(last.school_days_remaining, 0);
    assert_eq!(last.calendar_days_remaining, 1);

    let after = cal.compute_remaining(date(2026, 6, 1));
    assert_eq!(after.school_days_remaining, 0);
    assert_eq!(after.calendar_days_remaining, 0);
}

#[test]
fn test_next_break() {
    let cal = calendar();

    let run = cal.next_non_attendance(date(2025, 11, 20)).unwrap();
    assert_eq!(run.label, "Thanksgiving Break");
    assert_eq!((run.start, run.end), (date(2025, 11, 26), date(2025, 11, 28)));

    let run = cal.next_non_attendance(date(2025, 12, 20)).unwrap();
    assert_eq!(run.label, "Winter Break");
    assert_eq!(run.end, date(2026, 1, 2));

    assert_eq!(cal.next_non_attendance(date(2026, 4, 6)), None);
}

#[test]
fn test_malformed_custom_override_falls_back_to_default() {
    let mut cal = calendar();
    let wednesday = date(2025, 9, 10);
    cal.overrides_mut()
        .set(wednesday, ScheduleOverride::Custom(vec![]))
        .unwrap();

    let resolved = cal.resolve_schedule(wednesday);
    assert_eq!(resolved.name, "DEFAULT");
    assert_eq!(resolved.source, ScheduleSource::Default);
    assert!(matches!(
        resolved.warnings.as_slice(),
        [ResolveWarning::MalformedOverride { .. }]
    ));
}

#[test]
fn test_snapshot_on_a_late_start_morning() {
    let cal = calendar();
    let now = at(date(2025, 9, 3), 9, 0);
    let snap = cal.snapshot(now);

    assert_eq!(snap.name, "Example High");
    assert!(snap.classification.is_school_day());
    assert_eq!(snap.schedule.as_ref().map(|s| s.name.as_str()), Some("WED_LATE"));
    // Before the 09:40 bell.
    assert_eq!(snap.periods.current_period_index, None);
    assert_eq!(snap.periods.remaining_periods, 9);
    assert_eq!(
        snap.next_non_attendance.map(|r| r.label),
        Some("Indigenous Peoples Day".to_string())
    );
}

#[test]
fn test_first_progress_report_has_22_school_days() {
    let cal = calendar();
    let monday = date(2025, 9, 8);

    let current = cal.current_marking_period(monday).unwrap();
    assert_eq!(current.period.title, "Progress Report 1");
    assert_eq!(current.period.note.as_deref(), Some("(22 days)"));
    assert_eq!(current.school_days, 22);
    assert_eq!(current.school_days_remaining, 3);

    let all = cal.marking_period_progress(monday);
    assert_eq!(all[1].period.title, "Quarter 1");
    assert_eq!(all[1].school_days, 43);
    assert_eq!(all[1].school_days_remaining, 24);

    let later = cal.current_marking_period(date(2025, 9, 15)).unwrap();
    assert_eq!(later.period.title, "Quarter 1");
    assert_eq!(cal.current_marking_period(date(2025, 10, 14)), None);
}

#[test]
fn test_early_release_keeps_its_schedule() {
    let cal = calendar();
    let day = date(2025, 11, 25);

    let early = cal.early_release(day).unwrap();
    assert_eq!(early.dismissal, NaiveTime::from_hms_opt(12, 30, 0));
    assert!(cal.classify_day(day).is_school_day());
    assert_eq!(cal.resolve_schedule(day).name, "DEFAULT");

    let snap = cal.snapshot(at(day, 8, 0));
    assert_eq!(snap.early_release.as_ref(), Some(early));
}
