use anyhow::Result;
use chrono::NaiveDate;
use schoolday_core::{DayClassification, EarlyRelease, ResolvedSchedule, SchoolCalendar};
use serde::Serialize;

use crate::render::{Render, ScheduleRender};

#[derive(Serialize)]
struct DayReport {
    date: NaiveDate,
    classification: DayClassification,
    schedule: Option<ResolvedSchedule>,
    early_release: Option<EarlyRelease>,
}

pub fn run(calendar: &SchoolCalendar, date: NaiveDate, json: bool) -> Result<()> {
    let classification = calendar.classify_day(date);
    let schedule = classification
        .is_school_day()
        .then(|| calendar.resolve_schedule(date));
    if let Some(schedule) = &schedule {
        super::log_warnings(schedule);
    }
    let early_release = calendar.early_release(date).cloned();

    if json {
        let report = DayReport {
            date,
            classification,
            schedule,
            early_release,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("{}  {}", date.format("%a %Y-%m-%d"), classification.render());
    if let Some(early) = &early_release {
        println!("{}", early.render());
    }
    if let Some(schedule) = &schedule {
        println!("{}", schedule.render_at(None));
    }

    Ok(())
}
