use anyhow::Result;
use chrono::NaiveDate;
use owo_colors::OwoColorize;
use schoolday_core::SchoolCalendar;

use crate::render::{Render, pluralize};

pub fn run(calendar: &SchoolCalendar, from: NaiveDate, json: bool) -> Result<()> {
    let remaining = calendar.compute_remaining(from);

    if json {
        println!("{}", serde_json::to_string_pretty(&remaining)?);
        return Ok(());
    }

    let end = calendar.range().end();
    println!(
        "{} {} until {}",
        remaining.school_days_remaining.bold(),
        pluralize("school day", remaining.school_days_remaining),
        end.format("%a %b %-d, %Y")
    );
    println!("{}", remaining.render());

    Ok(())
}
