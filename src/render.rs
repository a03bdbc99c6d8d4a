//! Terminal rendering for schoolday-core types.
//!
//! Extension traits that add colored output to core types using owo_colors.

use chrono::NaiveDateTime;
use owo_colors::OwoColorize;
use schoolday_core::marking_period::{EarlyRelease, MarkingPeriodProgress, MarkingPeriodStatus};
use schoolday_core::non_attendance::NonAttendanceRun;
use schoolday_core::overrides::ScheduleOverride;
use schoolday_core::schedule::AnchoredPeriod;
use schoolday_core::{DayClassification, RemainingTime, ResolvedSchedule};

pub trait Render {
    fn render(&self) -> String;
}

impl Render for DayClassification {
    fn render(&self) -> String {
        let text = self.to_string();
        match self {
            DayClassification::SchoolDay => text.green().to_string(),
            DayClassification::Weekend => text.dimmed().to_string(),
            DayClassification::Holiday(_) => text.yellow().to_string(),
            DayClassification::NotStarted | DayClassification::Completed => text.blue().to_string(),
        }
    }
}

impl Render for RemainingTime {
    fn render(&self) -> String {
        [
            format!(
                "  School days left:    {} of {}",
                self.school_days_remaining.bold(),
                self.total_school_days
            ),
            format!("  Calendar days left:  {}", self.calendar_days_remaining),
            format!(
                "  Progress:            {}% done, {}% to go",
                self.percent_complete,
                self.percent_remaining
            ),
        ]
        .join("\n")
    }
}

impl Render for NonAttendanceRun {
    fn render(&self) -> String {
        let when = if self.is_single_day() {
            self.start.format("%a %b %-d").to_string()
        } else {
            format!(
                "{} - {}",
                self.start.format("%a %b %-d"),
                self.end.format("%a %b %-d")
            )
        };
        format!("{} {}", self.label.yellow(), when.dimmed())
    }
}

impl Render for MarkingPeriodProgress {
    fn render(&self) -> String {
        let p = &self.period;
        let dates = format!("{} - {}", p.start.format("%b %-d"), p.end.format("%b %-d"));
        let counts = match self.status {
            MarkingPeriodStatus::Current => format!(
                "{} of {} school days left",
                self.school_days_remaining, self.school_days
            ),
            _ => format!("{} school days", self.school_days),
        };
        let title = match self.status {
            MarkingPeriodStatus::Current => p.title.green().bold().to_string(),
            MarkingPeriodStatus::Upcoming => p.title.to_string(),
            MarkingPeriodStatus::Past => p.title.dimmed().to_string(),
        };
        let note = p.note.as_deref().map(|n| format!(" {}", n.dimmed())).unwrap_or_default();

        format!("{} {}  {}{}", title, dates.dimmed(), counts, note)
    }
}

impl Render for EarlyRelease {
    fn render(&self) -> String {
        let when = self
            .dismissal
            .map(|t| format!("Early release at {}", t.format("%H:%M")))
            .unwrap_or_else(|| "Early release".to_string());
        match &self.title {
            Some(title) => format!("{} {}", when.yellow(), format!("({})", title).dimmed()),
            None => when.yellow().to_string(),
        }
    }
}

impl Render for ScheduleOverride {
    fn render(&self) -> String {
        match self {
            ScheduleOverride::Named(name) => name.bold().to_string(),
            ScheduleOverride::Custom(_) => self.to_string().magenta().to_string(),
        }
    }
}

impl Render for AnchoredPeriod {
    fn render(&self) -> String {
        let line = format!(
            "{} - {}  {}",
            self.start.format("%H:%M"),
            self.end.format("%H:%M"),
            self.label
        );
        if self.counts_toward_remaining {
            line
        } else {
            format!("{} {}", line, "(not counted)".dimmed())
        }
    }
}

/// Schedule rendering that can highlight the period running at a moment.
pub trait ScheduleRender {
    fn render_at(&self, now: Option<NaiveDateTime>) -> String;
}

impl ScheduleRender for ResolvedSchedule {
    fn render_at(&self, now: Option<NaiveDateTime>) -> String {
        let hours = match (self.first_start(), self.last_end()) {
            (Some(start), Some(end)) => format!(" {} - {}", start.format("%H:%M"), end.format("%H:%M")),
            _ => String::new(),
        };
        let mut lines = vec![format!(
            "{}{} {}",
            self.name.bold(),
            hours,
            format!("({})", self.source).dimmed()
        )];

        if self.periods.is_empty() {
            lines.push("  No periods".dimmed().to_string());
        }

        for period in &self.periods {
            let current = now.is_some_and(|now| period.contains(now));
            let ended = now.is_some_and(|now| period.end <= now);
            let line = period.render();
            lines.push(if current {
                format!("{} {}", "▶".green(), line.green())
            } else if ended {
                format!("  {}", line.dimmed())
            } else {
                format!("  {}", line)
            });
        }

        lines.join("\n")
    }
}

pub fn pluralize(word: &str, count: u32) -> String {
    if count == 1 {
        word.to_string()
    } else {
        format!("{}s", word)
    }
}
