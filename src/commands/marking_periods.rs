use anyhow::Result;
use chrono::NaiveDate;
use owo_colors::OwoColorize;
use schoolday_core::SchoolCalendar;
use schoolday_core::marking_period::MarkingPeriodStatus;

use crate::render::Render;

/// List marking periods. Without `all`, past ones are hidden.
pub fn run(calendar: &SchoolCalendar, today: NaiveDate, all: bool, json: bool) -> Result<()> {
    let periods: Vec<_> = calendar
        .marking_period_progress(today)
        .into_iter()
        .filter(|p| all || p.status != MarkingPeriodStatus::Past)
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&periods)?);
        return Ok(());
    }

    if periods.is_empty() {
        println!("{}", "No marking periods".dimmed());
        return Ok(());
    }

    for period in &periods {
        println!("{}", period.render());
    }
    Ok(())
}
