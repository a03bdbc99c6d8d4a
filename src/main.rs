mod commands;
mod logging;
mod render;

use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::NaiveDateTime;
use clap::{Parser, Subcommand};
use schoolday_core::date::{parse_clock, parse_date};
use schoolday_core::{SchoolCalendar, SchoolConfig};

#[derive(Parser)]
#[command(name = "schoolday")]
#[command(about = "How much of the school year is left, and what bell schedule runs today")]
struct Cli {
    /// Path to the config file (defaults to ~/.config/schoolday/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Dashboard for today: day kind, countdown, current period, next break
    Today {
        /// Pretend today is this date (YYYY-MM-DD)
        #[arg(long)]
        date: Option<String>,

        /// Pretend it is this time of day (HH:MM)
        #[arg(long)]
        time: Option<String>,

        #[arg(long)]
        json: bool,
    },
    /// Classification and bell schedule for one date
    Day {
        /// Date to look up (YYYY-MM-DD)
        date: String,

        #[arg(long)]
        json: bool,
    },
    /// School days and calendar days left in the year
    Remaining {
        /// Count from this date instead of today (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,

        #[arg(long)]
        json: bool,
    },
    /// Day-by-day listing
    Calendar {
        /// First date to list (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        from: Option<String>,

        /// Last date to list (YYYY-MM-DD, defaults to a week after --from)
        #[arg(long)]
        to: Option<String>,
    },
    /// Marking periods with school days left in each
    MarkingPeriods {
        /// Include marking periods that have ended
        #[arg(long)]
        all: bool,

        #[arg(long)]
        json: bool,
    },
    /// Manage per-date schedule overrides
    Override {
        #[command(subcommand)]
        action: OverrideAction,
    },
    /// Show config and override file locations
    Config,
}

#[derive(Subcommand)]
enum OverrideAction {
    /// Pin a date to a named schedule
    Set { date: String, schedule: String },
    /// Pin a date to inline periods, given as a JSON array
    Custom { date: String, periods: String },
    /// Remove the override for a date
    Remove { date: String },
    /// Remove every override
    Clear,
    /// List all overrides
    List,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let config_path = match cli.config {
        Some(path) => path,
        None => SchoolConfig::config_path()?,
    };

    match cli.command {
        Commands::Config => commands::config::run(&config_path),
        Commands::Today { date, time, json } => {
            let calendar = open_calendar(&config_path)?;
            let now = reference_now(&calendar, date.as_deref(), time.as_deref())?;
            commands::today::run(&calendar, now, json)
        }
        Commands::Day { date, json } => {
            let calendar = open_calendar(&config_path)?;
            commands::day::run(&calendar, parse_date(&date)?, json)
        }
        Commands::Remaining { from, json } => {
            let calendar = open_calendar(&config_path)?;
            let from = match from {
                Some(from) => parse_date(&from)?,
                None => calendar.now().date(),
            };
            commands::remaining::run(&calendar, from, json)
        }
        Commands::Calendar { from, to } => {
            let calendar = open_calendar(&config_path)?;
            let from = match from {
                Some(from) => parse_date(&from)?,
                None => calendar.now().date(),
            };
            let to = to.as_deref().map(parse_date).transpose()?;
            commands::calendar::run(&calendar, from, to)
        }
        Commands::MarkingPeriods { all, json } => {
            let calendar = open_calendar(&config_path)?;
            let today = calendar.now().date();
            commands::marking_periods::run(&calendar, today, all, json)
        }
        Commands::Override { action } => {
            let mut calendar = open_calendar(&config_path)?;
            match action {
                OverrideAction::Set { date, schedule } => {
                    commands::overrides::set(&mut calendar, parse_date(&date)?, &schedule)
                }
                OverrideAction::Custom { date, periods } => {
                    commands::overrides::custom(&mut calendar, parse_date(&date)?, &periods)
                }
                OverrideAction::Remove { date } => {
                    commands::overrides::remove(&mut calendar, parse_date(&date)?)
                }
                OverrideAction::Clear => commands::overrides::clear(&mut calendar),
                OverrideAction::List => commands::overrides::list(&calendar),
            }
        }
    }
}

/// Load the config and build the calendar, writing a starter config first
/// if none exists.
fn open_calendar(config_path: &Path) -> Result<SchoolCalendar> {
    if !config_path.exists() {
        SchoolConfig::create_default_config(config_path)?;
        anyhow::bail!(
            "No school configured yet.\n\n\
            A starter config was written to:\n  {}\n\n\
            Fill in first_day, last_day and at least one schedule, then run again.",
            config_path.display()
        );
    }

    let config = SchoolConfig::load(config_path)?;
    tracing::info!(path = %config_path.display(), school = %config.name, "loaded config");

    Ok(config.open()?)
}

/// The one clock reading used for the whole run, in the school's zone.
/// `--date` and `--time` replace the matching half of it.
fn reference_now(calendar: &SchoolCalendar, date: Option<&str>, time: Option<&str>) -> Result<NaiveDateTime> {
    let now = calendar.now();
    let date = match date {
        Some(d) => parse_date(d)?,
        None => now.date(),
    };
    let time = match time {
        Some(t) => parse_clock(t)?,
        None => now.time(),
    };
    Ok(date.and_time(time))
}
