use anyhow::Result;
use chrono::NaiveDate;
use owo_colors::OwoColorize;
use schoolday_core::overrides::ScheduleOverride;
use schoolday_core::schedule::{Period, validate_periods};
use schoolday_core::SchoolCalendar;

use crate::render::Render;

pub fn set(calendar: &mut SchoolCalendar, date: NaiveDate, schedule: &str) -> Result<()> {
    let catalog = calendar.resolver().catalog();
    if catalog.get(schedule).is_none() {
        let available: Vec<_> = catalog.names().collect();
        anyhow::bail!(
            "Schedule '{}' not found. Available: {}",
            schedule,
            available.join(", ")
        );
    }

    warn_if_no_school(calendar, date);
    calendar
        .overrides_mut()
        .set(date, ScheduleOverride::Named(schedule.to_string()))?;
    tracing::info!(%date, schedule, "override set");

    println!("{} {} -> {}", "Set".green(), date, schedule.bold());
    Ok(())
}

/// `periods` is a JSON array of `{id, label, start, end, include?}`.
pub fn custom(calendar: &mut SchoolCalendar, date: NaiveDate, periods: &str) -> Result<()> {
    let periods: Vec<Period> = serde_json::from_str(periods)
        .map_err(|e| anyhow::anyhow!("Could not parse periods: {}", e))?;
    if periods.is_empty() {
        anyhow::bail!("A custom schedule needs at least one period");
    }
    if let Err(issue) = validate_periods(&periods) {
        anyhow::bail!("Invalid custom schedule: {}", issue);
    }

    warn_if_no_school(calendar, date);
    let value = ScheduleOverride::Custom(periods);
    println!("{} {} -> {}", "Set".green(), date, value.render());
    calendar.overrides_mut().set(date, value)?;
    tracing::info!(%date, "custom override set");

    Ok(())
}

pub fn remove(calendar: &mut SchoolCalendar, date: NaiveDate) -> Result<()> {
    if calendar.overrides_mut().remove(date)? {
        println!("{} override for {}", "Removed".red(), date);
    } else {
        println!("{}", format!("No override for {}", date).dimmed());
    }
    Ok(())
}

pub fn clear(calendar: &mut SchoolCalendar) -> Result<()> {
    let count = calendar.overrides().entries().len();
    calendar.overrides_mut().clear()?;
    println!("{} {} overrides", "Cleared".red(), count);
    Ok(())
}

pub fn list(calendar: &SchoolCalendar) -> Result<()> {
    let entries = calendar.overrides().entries();
    if entries.is_empty() {
        println!("{}", "No overrides".dimmed());
        return Ok(());
    }

    for (date, value) in entries {
        println!("{}  {}", date.format("%a %Y-%m-%d"), value.render());
    }
    Ok(())
}

/// Overrides on days without school are kept but never consulted.
fn warn_if_no_school(calendar: &SchoolCalendar, date: NaiveDate) {
    let classification = calendar.classify_day(date);
    if !classification.is_school_day() {
        tracing::warn!(%date, %classification, "override set on a day without school");
    }
}
