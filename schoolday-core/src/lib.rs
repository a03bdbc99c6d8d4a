//! Core engine for schoolday.
//!
//! Given a school year's date range, its non-attendance periods and its
//! bell schedules, this crate answers:
//! - whether a date is a school day (`classify`)
//! - which bell schedule applies to a date (`resolver`)
//! - how many school and calendar days are left (`remaining`)
//! - which period is running and how many are left today (`period`)
//! - how far into the current marking period we are (`marking_period`)
//!
//! `SchoolCalendar` composes these over one configured year, and `config`
//! builds it from a TOML file.

pub mod calendar_range;
pub mod classify;
pub mod config;
pub mod date;
pub mod error;
pub mod marking_period;
pub mod non_attendance;
pub mod overrides;
pub mod period;
pub mod remaining;
pub mod resolver;
pub mod schedule;
pub mod school_calendar;

pub use calendar_range::CalendarRange;
pub use classify::DayClassification;
pub use config::SchoolConfig;
pub use error::{SchoolDayError, SchoolDayResult};
pub use marking_period::{EarlyRelease, MarkingPeriod, MarkingPeriodProgress};
pub use non_attendance::{NonAttendanceEntry, NonAttendanceMap, NonAttendanceRun};
pub use overrides::{FileOverrideStore, MemoryOverrideStore, OverrideStore, ScheduleOverride};
pub use period::PeriodStatus;
pub use remaining::RemainingTime;
pub use resolver::{ResolvedSchedule, ScheduleResolver, ScheduleSource};
pub use schedule::{Period, Schedule, ScheduleCatalog};
pub use school_calendar::{DashboardSnapshot, DayRecord, SchoolCalendar};
