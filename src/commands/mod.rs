pub mod calendar;
pub mod config;
pub mod day;
pub mod marking_periods;
pub mod overrides;
pub mod remaining;
pub mod today;

use schoolday_core::ResolvedSchedule;

/// Surface non-fatal resolution problems in the log.
pub fn log_warnings(schedule: &ResolvedSchedule) {
    for warning in &schedule.warnings {
        tracing::warn!(date = %schedule.date, "{}", warning);
    }
}
