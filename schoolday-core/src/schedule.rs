//! Bell schedules: periods, named schedules and the catalog holding them.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::date::{clock, format_clock};
use crate::error::{SchoolDayError, SchoolDayResult};

fn default_true() -> bool {
    true
}

/// One time block within a school day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    pub id: String,
    pub label: String,
    #[serde(with = "clock")]
    pub start: NaiveTime,
    #[serde(with = "clock")]
    pub end: NaiveTime,
    /// Whether this period counts toward "periods left today".
    /// Homeroom and similar blocks set this to false.
    #[serde(default = "default_true", alias = "include")]
    pub counts_toward_remaining: bool,
}

impl Period {
    pub fn new(id: impl Into<String>, label: impl Into<String>, start: NaiveTime, end: NaiveTime) -> Self {
        Period {
            id: id.into(),
            label: label.into(),
            start,
            end,
            counts_toward_remaining: true,
        }
    }

    /// Same period, excluded from the remaining count.
    pub fn uncounted(mut self) -> Self {
        self.counts_toward_remaining = false;
        self
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} {}-{}",
            self.label,
            format_clock(self.start),
            format_clock(self.end)
        )
    }
}

/// Why a period list failed shape validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "issue", rename_all = "snake_case")]
pub enum PeriodIssue {
    Empty,
    /// Period at `index` does not end after it starts.
    EmptyInterval { index: usize },
    /// Period at `index` starts before the previous period ends.
    OutOfOrder { index: usize },
}

impl fmt::Display for PeriodIssue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PeriodIssue::Empty => write!(f, "period list is empty"),
            PeriodIssue::EmptyInterval { index } => {
                write!(f, "period {} does not end after it starts", index + 1)
            }
            PeriodIssue::OutOfOrder { index } => {
                write!(f, "period {} starts before the previous period ends", index + 1)
            }
        }
    }
}

/// Check that every period has `start < end` and that periods are in
/// order without overlapping. An empty list passes; callers that need a
/// non-empty list check that themselves.
pub fn validate_periods(periods: &[Period]) -> Result<(), PeriodIssue> {
    for (index, period) in periods.iter().enumerate() {
        if period.start >= period.end {
            return Err(PeriodIssue::EmptyInterval { index });
        }
        if index > 0 && period.start < periods[index - 1].end {
            return Err(PeriodIssue::OutOfOrder { index });
        }
    }
    Ok(())
}

/// A named, ordered list of periods.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Schedule {
    pub name: String,
    pub periods: Vec<Period>,
    pub is_default: bool,
}

impl Schedule {
    pub fn new(name: impl Into<String>, periods: Vec<Period>) -> Self {
        Schedule {
            name: name.into(),
            periods,
            is_default: false,
        }
    }
}

/// A period pinned to a concrete date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnchoredPeriod {
    pub id: String,
    pub label: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    /// Effective flag after any include-only filter.
    pub counts_toward_remaining: bool,
}

impl AnchoredPeriod {
    pub fn contains(&self, now: NaiveDateTime) -> bool {
        self.start <= now && now < self.end
    }
}

/// Named schedules plus the default designation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleCatalog {
    schedules: BTreeMap<String, Schedule>,
    default_name: String,
    include_only: Option<BTreeSet<String>>,
}

impl ScheduleCatalog {
    /// Build a catalog. Rejects duplicate names, malformed period lists,
    /// and a default name that is not among `schedules`.
    pub fn new(schedules: Vec<Schedule>, default_name: impl Into<String>) -> SchoolDayResult<Self> {
        let default_name = default_name.into();
        let mut by_name = BTreeMap::new();

        for mut schedule in schedules {
            validate_periods(&schedule.periods).map_err(|issue| {
                SchoolDayError::Config(format!("Schedule '{}': {}", schedule.name, issue))
            })?;
            schedule.is_default = schedule.name == default_name;

            if by_name.contains_key(&schedule.name) {
                return Err(SchoolDayError::Config(format!(
                    "Schedule '{}' is defined more than once",
                    schedule.name
                )));
            }
            by_name.insert(schedule.name.clone(), schedule);
        }

        if !by_name.contains_key(&default_name) {
            return Err(SchoolDayError::Config(format!(
                "Default schedule '{}' is not defined",
                default_name
            )));
        }

        Ok(ScheduleCatalog {
            schedules: by_name,
            default_name,
            include_only: None,
        })
    }

    /// Count only periods whose id is in `ids`, regardless of their own flag.
    pub fn with_include_only<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.include_only = Some(ids.into_iter().map(Into::into).collect());
        self
    }

    pub fn get(&self, name: &str) -> Option<&Schedule> {
        self.schedules.get(name)
    }

    pub fn default_schedule(&self) -> &Schedule {
        // Presence is checked in `new`.
        &self.schedules[&self.default_name]
    }

    pub fn default_name(&self) -> &str {
        &self.default_name
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.schedules.keys().map(String::as_str)
    }

    pub fn counts(&self, period: &Period) -> bool {
        match &self.include_only {
            Some(ids) => ids.contains(&period.id),
            None => period.counts_toward_remaining,
        }
    }

    /// Pin `periods` to `date`, applying the include-only filter.
    pub fn anchor(&self, periods: &[Period], date: NaiveDate) -> Vec<AnchoredPeriod> {
        periods
            .iter()
            .map(|p| AnchoredPeriod {
                id: p.id.clone(),
                label: p.label.clone(),
                start: date.and_time(p.start),
                end: date.and_time(p.end),
                counts_toward_remaining: self.counts(p),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn two_periods() -> Vec<Period> {
        vec![
            Period::new("01", "Period 01", t(8, 10), t(8, 52)),
            Period::new("HR", "Homeroom", t(8, 57), t(9, 7)).uncounted(),
        ]
    }

    #[test]
    fn test_validate_periods() {
        assert_eq!(validate_periods(&two_periods()), Ok(()));
        assert_eq!(validate_periods(&[]), Ok(()));

        let backwards = vec![Period::new("01", "Period 01", t(9, 0), t(8, 0))];
        assert_eq!(
            validate_periods(&backwards),
            Err(PeriodIssue::EmptyInterval { index: 0 })
        );

        let overlapping = vec![
            Period::new("01", "Period 01", t(8, 10), t(8, 52)),
            Period::new("02", "Period 02", t(8, 50), t(9, 30)),
        ];
        assert_eq!(
            validate_periods(&overlapping),
            Err(PeriodIssue::OutOfOrder { index: 1 })
        );
    }

    #[test]
    fn test_catalog_marks_default_and_rejects_unknown_default() {
        let catalog = ScheduleCatalog::new(vec![Schedule::new("DEFAULT", two_periods())], "DEFAULT").unwrap();
        assert!(catalog.default_schedule().is_default);
        assert_eq!(catalog.default_name(), "DEFAULT");

        let err = ScheduleCatalog::new(vec![Schedule::new("DEFAULT", two_periods())], "MISSING");
        assert!(matches!(err, Err(SchoolDayError::Config(_))));
    }

    #[test]
    fn test_catalog_rejects_duplicates_and_bad_periods() {
        let dup = ScheduleCatalog::new(
            vec![Schedule::new("A", vec![]), Schedule::new("A", vec![])],
            "A",
        );
        assert!(dup.is_err());

        let bad = ScheduleCatalog::new(
            vec![Schedule::new("A", vec![Period::new("01", "P", t(9, 0), t(9, 0))])],
            "A",
        );
        assert!(bad.unwrap_err().to_string().contains("Schedule 'A'"));
    }

    #[test]
    fn test_anchor_pins_clock_times_to_date() {
        let catalog = ScheduleCatalog::new(vec![Schedule::new("DEFAULT", two_periods())], "DEFAULT").unwrap();
        let date = NaiveDate::from_ymd_opt(2025, 9, 3).unwrap();
        let anchored = catalog.anchor(&catalog.default_schedule().periods, date);

        assert_eq!(anchored[0].start, date.and_hms_opt(8, 10, 0).unwrap());
        assert_eq!(anchored[0].end, date.and_hms_opt(8, 52, 0).unwrap());
        assert!(anchored[0].counts_toward_remaining);
        assert!(!anchored[1].counts_toward_remaining);
    }

    #[test]
    fn test_include_only_overrides_period_flags() {
        let catalog = ScheduleCatalog::new(vec![Schedule::new("DEFAULT", two_periods())], "DEFAULT")
            .unwrap()
            .with_include_only(["HR"]);
        let date = NaiveDate::from_ymd_opt(2025, 9, 3).unwrap();
        let anchored = catalog.anchor(&catalog.default_schedule().periods, date);

        assert!(!anchored[0].counts_toward_remaining);
        assert!(anchored[1].counts_toward_remaining);
    }

    #[test]
    fn test_period_json_accepts_include_alias_and_defaults_to_counted() {
        let periods: Vec<Period> = serde_json::from_str(
            r#"[
                {"id": "01", "label": "Period 01", "start": "08:10", "end": "08:52"},
                {"id": "HR", "label": "Homeroom", "start": "10:31", "end": "10:41", "include": false}
            ]"#,
        )
        .unwrap();

        assert!(periods[0].counts_toward_remaining);
        assert!(!periods[1].counts_toward_remaining);
        assert_eq!(periods[1].start, t(10, 31));
    }
}
