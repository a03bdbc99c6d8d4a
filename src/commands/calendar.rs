use anyhow::Result;
use chrono::{Days, NaiveDate};
use owo_colors::OwoColorize;
use schoolday_core::SchoolCalendar;

use crate::render::Render;

/// Days listed after `--from` when `--to` is not given.
const DEFAULT_SPAN_DAYS: u64 = 6;

pub fn run(calendar: &SchoolCalendar, from: NaiveDate, to: Option<NaiveDate>) -> Result<()> {
    let to = match to {
        Some(to) => to,
        None => from
            .checked_add_days(Days::new(DEFAULT_SPAN_DAYS))
            .unwrap_or(from),
    };
    if to < from {
        anyhow::bail!("--to ({}) is before --from ({})", to, from);
    }

    for day in calendar.days(from, to) {
        let schedule = day
            .schedule
            .map(|name| format!("[{}]", name).dimmed().to_string())
            .unwrap_or_default();
        let early = if day.early_release {
            " early release".yellow().to_string()
        } else {
            String::new()
        };
        println!(
            "{}  {} {}{}",
            day.date.format("%a %Y-%m-%d"),
            day.classification.render(),
            schedule,
            early
        );
    }

    Ok(())
}
