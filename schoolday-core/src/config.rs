//! School configuration file.
//!
//! The file is TOML, read through the `config` crate so `SCHOOLDAY_*`
//! environment variables can override top-level keys. Everything is kept
//! as plain strings until [`SchoolConfig::build`], which validates and
//! converts it into engine types in one pass.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use chrono::{NaiveDate, Weekday};
use chrono_tz::Tz;
use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;

use crate::calendar_range::CalendarRange;
use crate::date::{parse_clock, parse_date, parse_timezone, system_timezone};
use crate::error::{SchoolDayError, SchoolDayResult};
use crate::marking_period::{EarlyRelease, MarkingPeriod};
use crate::non_attendance::{NonAttendanceEntry, find_overlap};
use crate::overrides::{FileOverrideStore, OverrideStore};
use crate::resolver::{DateListTier, ScheduleResolver};
use crate::schedule::{Period, Schedule, ScheduleCatalog};
use crate::school_calendar::SchoolCalendar;

static DEFAULT_SCHEDULE_NAME: &str = "DEFAULT";

fn default_schedule_name() -> String {
    DEFAULT_SCHEDULE_NAME.to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct NonAttendanceConfig {
    pub label: String,
    pub start: String,
    /// Defaults to `start` for single-day entries.
    pub end: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleConfig {
    pub name: String,
    #[serde(default)]
    pub periods: Vec<Period>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DateListConfig {
    pub name: String,
    pub schedule: String,
    #[serde(default)]
    pub dates: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WeekdayRuleConfig {
    pub weekday: String,
    pub schedule: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MarkingPeriodConfig {
    pub title: String,
    pub start: String,
    pub end: String,
    pub note: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EarlyReleaseConfig {
    pub date: String,
    pub title: Option<String>,
    /// Dismissal time, `HH:MM`.
    pub dismissal: Option<String>,
}

/// Configuration at ~/.config/schoolday/config.toml
#[derive(Debug, Clone, Deserialize)]
pub struct SchoolConfig {
    #[serde(default)]
    pub name: String,

    /// IANA zone name; the system zone when absent.
    pub timezone: Option<String>,

    pub first_day: String,
    pub last_day: String,

    #[serde(default = "default_schedule_name")]
    pub default_schedule: String,

    /// Where per-date overrides are kept; `~` is expanded.
    pub overrides_path: Option<PathBuf>,

    /// When set, only these period ids count toward periods left.
    pub include_only: Option<Vec<String>>,

    #[serde(default)]
    pub non_attendance: Vec<NonAttendanceConfig>,

    #[serde(default)]
    pub schedules: Vec<ScheduleConfig>,

    #[serde(default)]
    pub special_dates: BTreeMap<String, String>,

    #[serde(default)]
    pub date_lists: Vec<DateListConfig>,

    #[serde(default)]
    pub weekday_rules: Vec<WeekdayRuleConfig>,

    #[serde(default)]
    pub marking_periods: Vec<MarkingPeriodConfig>,

    #[serde(default)]
    pub early_release: Vec<EarlyReleaseConfig>,
}

fn field_date(field: &str, value: &str) -> SchoolDayResult<NaiveDate> {
    parse_date(value).map_err(|e| SchoolDayError::Config(format!("{}: {}", field, e)))
}

impl SchoolConfig {
    pub fn config_path() -> SchoolDayResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| SchoolDayError::Config("Could not determine config directory".into()))?
            .join("schoolday");

        Ok(config_dir.join("config.toml"))
    }

    /// Load from `path`, with `SCHOOLDAY_*` environment overrides on top.
    pub fn load(path: &Path) -> SchoolDayResult<Self> {
        Config::builder()
            .add_source(File::from(path.to_path_buf()).format(FileFormat::Toml))
            .add_source(Environment::with_prefix("SCHOOLDAY"))
            .build()
            .map_err(|e| SchoolDayError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| SchoolDayError::Config(e.to_string()))
    }

    /// Parse TOML text directly, without environment overrides.
    pub fn from_toml_str(content: &str) -> SchoolDayResult<Self> {
        Config::builder()
            .add_source(File::from_str(content, FileFormat::Toml))
            .build()
            .map_err(|e| SchoolDayError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| SchoolDayError::Config(e.to_string()))
    }

    /// Create a starter config with every option commented out.
    pub fn create_default_config(path: &Path) -> SchoolDayResult<()> {
        let contents = "\
# schoolday configuration

# name = \"Example High School\"
# timezone = \"America/Chicago\"
# first_day = \"2025-08-12\"
# last_day = \"2026-05-21\"
# default_schedule = \"DEFAULT\"

# Count only these period ids toward \"periods left\":
# include_only = [\"01\", \"02\", \"03\"]

# [[non_attendance]]
# label = \"Labor Day\"
# start = \"2025-09-01\"

# [[non_attendance]]
# label = \"Winter Break\"
# start = \"2025-12-22\"
# end = \"2026-01-02\"

# [[schedules]]
# name = \"DEFAULT\"
# periods = [
#   { id = \"01\", label = \"Period 01\", start = \"08:10\", end = \"08:52\" },
#   { id = \"HR\", label = \"Homeroom\", start = \"10:31\", end = \"10:41\", include = false },
# ]

# [special_dates]
# \"2025-12-17\" = \"EXAM\"

# [[date_lists]]
# name = \"late-arrival\"
# schedule = \"LATE_ARRIVAL_1010\"
# dates = [\"2025-09-05\"]

# [[weekday_rules]]
# weekday = \"Wed\"
# schedule = \"WED_LATE\"

# [[marking_periods]]
# title = \"Quarter 1\"
# start = \"2025-08-12\"
# end = \"2025-10-10\"

# [[early_release]]
# date = \"2025-11-25\"
# title = \"Thanksgiving\"
# dismissal = \"12:30\"
";

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                SchoolDayError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| SchoolDayError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }

    pub fn timezone(&self) -> SchoolDayResult<Tz> {
        match &self.timezone {
            Some(name) => parse_timezone(name),
            None => system_timezone(),
        }
    }

    pub fn overrides_path(&self) -> SchoolDayResult<PathBuf> {
        match &self.overrides_path {
            Some(path) => Ok(PathBuf::from(
                shellexpand::tilde(&path.to_string_lossy()).into_owned(),
            )),
            None => FileOverrideStore::default_path(),
        }
    }

    pub fn calendar_range(&self) -> SchoolDayResult<CalendarRange> {
        CalendarRange::new(
            field_date("first_day", &self.first_day)?,
            field_date("last_day", &self.last_day)?,
        )
    }

    /// Non-attendance entries, rejecting any that overlap.
    pub fn non_attendance_entries(&self) -> SchoolDayResult<Vec<NonAttendanceEntry>> {
        let entries = self
            .non_attendance
            .iter()
            .map(|e| {
                let start = field_date(&e.label, &e.start)?;
                let end = match &e.end {
                    Some(end) => field_date(&e.label, end)?,
                    None => start,
                };
                NonAttendanceEntry::new(e.label.clone(), start, end)
            })
            .collect::<SchoolDayResult<Vec<_>>>()?;

        if let Some((a, b)) = find_overlap(&entries) {
            return Err(SchoolDayError::Config(format!(
                "Non-attendance entries '{}' and '{}' overlap",
                entries[a].label, entries[b].label
            )));
        }

        Ok(entries)
    }

    /// Marking periods in configured order. Ones reaching outside the
    /// school year are kept and logged.
    pub fn marking_periods(&self, range: &CalendarRange) -> SchoolDayResult<Vec<MarkingPeriod>> {
        self.marking_periods
            .iter()
            .map(|m| -> SchoolDayResult<MarkingPeriod> {
                let start = field_date(&m.title, &m.start)?;
                let end = field_date(&m.title, &m.end)?;
                let period = MarkingPeriod::new(m.title.clone(), start, end)?;
                if !range.contains(start) || !range.contains(end) {
                    tracing::warn!(title = %m.title, "marking period extends outside the school year");
                }
                Ok(match &m.note {
                    Some(note) => period.with_note(note.clone()),
                    None => period,
                })
            })
            .collect()
    }

    pub fn early_release_days(&self) -> SchoolDayResult<Vec<EarlyRelease>> {
        self.early_release
            .iter()
            .map(|e| -> SchoolDayResult<EarlyRelease> {
                let dismissal = match &e.dismissal {
                    Some(time) => Some(
                        parse_clock(time)
                            .map_err(|err| SchoolDayError::Config(format!("early_release {}: {}", e.date, err)))?,
                    ),
                    None => None,
                };
                Ok(EarlyRelease {
                    date: field_date("early_release", &e.date)?,
                    title: e.title.clone(),
                    dismissal,
                })
            })
            .collect()
    }

    pub fn catalog(&self) -> SchoolDayResult<ScheduleCatalog> {
        let schedules = self
            .schedules
            .iter()
            .map(|s| Schedule::new(s.name.clone(), s.periods.clone()))
            .collect();
        let catalog = ScheduleCatalog::new(schedules, self.default_schedule.clone())?;

        Ok(match &self.include_only {
            Some(ids) => catalog.with_include_only(ids.iter().cloned()),
            None => catalog,
        })
    }

    pub fn resolver(&self) -> SchoolDayResult<ScheduleResolver> {
        let catalog = self.catalog()?;

        let special_dates = self
            .special_dates
            .iter()
            .map(|(date, name)| -> SchoolDayResult<(NaiveDate, String)> {
                Ok((field_date("special_dates", date)?, name.clone()))
            })
            .collect::<SchoolDayResult<BTreeMap<_, _>>>()?;

        let date_lists = self
            .date_lists
            .iter()
            .map(|list| -> SchoolDayResult<DateListTier> {
                let dates = list
                    .dates
                    .iter()
                    .map(|d| field_date(&list.name, d))
                    .collect::<SchoolDayResult<BTreeSet<_>>>()?;
                Ok(DateListTier::new(list.name.clone(), list.schedule.clone(), dates))
            })
            .collect::<SchoolDayResult<Vec<_>>>()?;

        let weekday_rules = self
            .weekday_rules
            .iter()
            .map(|rule| -> SchoolDayResult<(Weekday, String)> {
                let weekday = rule.weekday.parse::<Weekday>().map_err(|_| {
                    SchoolDayError::Config(format!("Unknown weekday '{}'", rule.weekday))
                })?;
                Ok((weekday, rule.schedule.clone()))
            })
            .collect::<SchoolDayResult<Vec<_>>>()?;

        self.warn_unknown_schedules(&catalog);

        Ok(ScheduleResolver::standard(
            catalog,
            special_dates,
            date_lists,
            weekday_rules,
        ))
    }

    /// Schedule names referenced by rules but absent from the catalog.
    /// These are not errors: the rule simply never matches.
    pub fn unknown_schedule_references(&self) -> Vec<String> {
        let known: BTreeSet<&str> = self.schedules.iter().map(|s| s.name.as_str()).collect();

        let referenced = self
            .special_dates
            .values()
            .chain(self.date_lists.iter().map(|l| &l.schedule))
            .chain(self.weekday_rules.iter().map(|r| &r.schedule));

        let mut unknown: Vec<String> = referenced
            .filter(|name| !known.contains(name.as_str()))
            .cloned()
            .collect();
        unknown.sort();
        unknown.dedup();
        unknown
    }

    fn warn_unknown_schedules(&self, catalog: &ScheduleCatalog) {
        for name in self.unknown_schedule_references() {
            tracing::warn!(
                schedule = %name,
                known = ?catalog.names().collect::<Vec<_>>(),
                "configuration refers to an unknown schedule"
            );
        }
    }

    /// Build the calendar around an explicit override store.
    pub fn build(&self, overrides: Box<dyn OverrideStore>) -> SchoolDayResult<SchoolCalendar> {
        let range = self.calendar_range()?;
        let calendar = SchoolCalendar::new(range, self.non_attendance_entries()?, self.resolver()?, overrides)
            .with_name(self.name.clone())
            .with_timezone(self.timezone()?)
            .with_marking_periods(self.marking_periods(&range)?)
            .with_early_release(self.early_release_days()?);

        Ok(calendar)
    }

    /// Build the calendar with the file-backed override store.
    pub fn open(&self) -> SchoolDayResult<SchoolCalendar> {
        let store = FileOverrideStore::open(self.overrides_path()?)?;
        self.build(Box::new(store))
    }
}
