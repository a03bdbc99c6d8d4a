use anyhow::Result;
use chrono::NaiveDateTime;
use owo_colors::OwoColorize;
use schoolday_core::SchoolCalendar;

use crate::render::{Render, ScheduleRender, pluralize};

pub fn run(calendar: &SchoolCalendar, now: NaiveDateTime, json: bool) -> Result<()> {
    let snapshot = calendar.snapshot(now);
    if let Some(schedule) = &snapshot.schedule {
        super::log_warnings(schedule);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
        return Ok(());
    }

    if !snapshot.name.is_empty() {
        println!("{}", snapshot.name.bold());
    }
    println!(
        "{}  {}",
        snapshot.now.format("%A %B %-d, %H:%M").dimmed(),
        snapshot.classification.render()
    );

    if let Some(early) = &snapshot.early_release {
        println!("{}", early.render());
    }

    if let Some(schedule) = &snapshot.schedule {
        println!();
        println!("{}", schedule.render_at(Some(now)));
        let left = snapshot.periods.remaining_periods as u32;
        println!(
            "  {} left today",
            format!("{} {}", left, pluralize("period", left)).bold()
        );
    }

    println!();
    println!("{}", "Countdown".bold());
    println!("{}", snapshot.remaining.render());

    if let Some(marking) = &snapshot.marking_period {
        println!();
        println!("{} {}", "Marking period:".bold(), marking.render());
    }

    if let Some(run) = &snapshot.next_non_attendance {
        println!();
        println!("{} {}", "Next break:".bold(), run.render());
    }

    Ok(())
}
