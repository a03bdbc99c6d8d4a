//! Which bell schedule applies to a date.
//!
//! Resolution walks an ordered chain of tiers and stops at the first one
//! that produces a usable schedule:
//!
//! 1. per-date override (from the injected [`OverrideStore`])
//! 2. special-date table
//! 3. named date lists, in configured order
//! 4. weekday rules
//! 5. the catalog default
//!
//! A tier naming a schedule the catalog does not have is skipped with a
//! [`ResolveWarning::MissingSchedule`]. A malformed custom override skips
//! every remaining tier and lands on the default with a
//! [`ResolveWarning::MalformedOverride`].

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chrono::{Datelike, NaiveDate, NaiveDateTime, Weekday};
use serde::Serialize;

use crate::overrides::{CUSTOM_SCHEDULE_NAME, OverrideStore, ScheduleOverride};
use crate::schedule::{AnchoredPeriod, Period, PeriodIssue, ScheduleCatalog, validate_periods};

/// The tier a resolved schedule came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "tier", rename_all = "snake_case")]
pub enum ScheduleSource {
    Override,
    SpecialDate,
    DateList { list: String },
    Weekday { weekday: Weekday },
    Default,
}

impl fmt::Display for ScheduleSource {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ScheduleSource::Override => write!(f, "override"),
            ScheduleSource::SpecialDate => write!(f, "special date"),
            ScheduleSource::DateList { list } => write!(f, "date list '{}'", list),
            ScheduleSource::Weekday { weekday } => write!(f, "weekday rule ({})", weekday),
            ScheduleSource::Default => write!(f, "default"),
        }
    }
}

/// Non-fatal problems met while resolving.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "warning", rename_all = "snake_case")]
pub enum ResolveWarning {
    MalformedOverride { date: NaiveDate, issue: PeriodIssue },
    MissingSchedule { source: ScheduleSource, name: String },
}

impl fmt::Display for ResolveWarning {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ResolveWarning::MalformedOverride { date, issue } => {
                write!(f, "Ignored custom override for {}: {}", date, issue)
            }
            ResolveWarning::MissingSchedule { source, name } => {
                write!(f, "The {} refers to unknown schedule '{}'", source, name)
            }
        }
    }
}

/// A schedule pinned to a date, with where it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedSchedule {
    pub date: NaiveDate,
    pub name: String,
    pub source: ScheduleSource,
    pub periods: Vec<AnchoredPeriod>,
    pub warnings: Vec<ResolveWarning>,
}

impl ResolvedSchedule {
    pub fn first_start(&self) -> Option<NaiveDateTime> {
        self.periods.first().map(|p| p.start)
    }

    pub fn last_end(&self) -> Option<NaiveDateTime> {
        self.periods.last().map(|p| p.end)
    }
}

/// What a tier matched: a catalog name, or inline periods.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Named(String),
    Custom(Vec<Period>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierMatch {
    pub source: ScheduleSource,
    pub resolution: Resolution,
}

impl TierMatch {
    fn named(source: ScheduleSource, name: &str) -> Self {
        TierMatch {
            source,
            resolution: Resolution::Named(name.to_string()),
        }
    }
}

/// Inputs a tier may consult.
pub struct ResolveContext<'a> {
    pub date: NaiveDate,
    pub overrides: &'a dyn OverrideStore,
}

/// One step of the priority chain.
pub trait ScheduleTier: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// `None` means "no opinion, ask the next tier".
    fn lookup(&self, ctx: &ResolveContext<'_>) -> Option<TierMatch>;
}

/// Administrator-set per-date overrides.
#[derive(Debug, Clone, Copy, Default)]
pub struct OverrideTier;

impl ScheduleTier for OverrideTier {
    fn name(&self) -> &str {
        "override"
    }

    fn lookup(&self, ctx: &ResolveContext<'_>) -> Option<TierMatch> {
        let resolution = match ctx.overrides.get(ctx.date)? {
            ScheduleOverride::Named(name) => Resolution::Named(name),
            ScheduleOverride::Custom(periods) => Resolution::Custom(periods),
        };
        Some(TierMatch {
            source: ScheduleSource::Override,
            resolution,
        })
    }
}

/// Static date -> schedule-name table (exam days, assemblies).
#[derive(Debug, Clone, Default)]
pub struct SpecialDateTier {
    dates: BTreeMap<NaiveDate, String>,
}

impl SpecialDateTier {
    pub fn new(dates: BTreeMap<NaiveDate, String>) -> Self {
        SpecialDateTier { dates }
    }
}

impl ScheduleTier for SpecialDateTier {
    fn name(&self) -> &str {
        "special-date"
    }

    fn lookup(&self, ctx: &ResolveContext<'_>) -> Option<TierMatch> {
        let name = self.dates.get(&ctx.date)?;
        Some(TierMatch::named(ScheduleSource::SpecialDate, name))
    }
}

/// Membership in a named list of dates maps to one fixed schedule.
#[derive(Debug, Clone)]
pub struct DateListTier {
    list: String,
    schedule: String,
    dates: BTreeSet<NaiveDate>,
}

impl DateListTier {
    pub fn new(list: impl Into<String>, schedule: impl Into<String>, dates: impl IntoIterator<Item = NaiveDate>) -> Self {
        DateListTier {
            list: list.into(),
            schedule: schedule.into(),
            dates: dates.into_iter().collect(),
        }
    }
}

impl ScheduleTier for DateListTier {
    fn name(&self) -> &str {
        &self.list
    }

    fn lookup(&self, ctx: &ResolveContext<'_>) -> Option<TierMatch> {
        if !self.dates.contains(&ctx.date) {
            return None;
        }
        Some(TierMatch::named(
            ScheduleSource::DateList {
                list: self.list.clone(),
            },
            &self.schedule,
        ))
    }
}

/// Weekday -> alternate schedule (e.g. every Wednesday starts late).
#[derive(Debug, Clone, Default)]
pub struct WeekdayTier {
    rules: Vec<(Weekday, String)>,
}

impl WeekdayTier {
    pub fn new(rules: Vec<(Weekday, String)>) -> Self {
        WeekdayTier { rules }
    }
}

impl ScheduleTier for WeekdayTier {
    fn name(&self) -> &str {
        "weekday"
    }

    fn lookup(&self, ctx: &ResolveContext<'_>) -> Option<TierMatch> {
        let weekday = ctx.date.weekday();
        let (_, name) = self.rules.iter().find(|(day, _)| *day == weekday)?;
        Some(TierMatch::named(ScheduleSource::Weekday { weekday }, name))
    }
}

/// Ordered tier chain over a schedule catalog.
pub struct ScheduleResolver {
    catalog: ScheduleCatalog,
    tiers: Vec<Box<dyn ScheduleTier>>,
}

impl ScheduleResolver {
    /// A resolver with no tiers; every date gets the default schedule.
    pub fn new(catalog: ScheduleCatalog) -> Self {
        ScheduleResolver {
            catalog,
            tiers: Vec::new(),
        }
    }

    /// The standard chain: override, special dates, each date list in
    /// order, then weekday rules.
    pub fn standard(
        catalog: ScheduleCatalog,
        special_dates: BTreeMap<NaiveDate, String>,
        date_lists: Vec<DateListTier>,
        weekday_rules: Vec<(Weekday, String)>,
    ) -> Self {
        let mut resolver = ScheduleResolver::new(catalog)
            .with_tier(OverrideTier)
            .with_tier(SpecialDateTier::new(special_dates));
        for list in date_lists {
            resolver = resolver.with_tier(list);
        }
        resolver.with_tier(WeekdayTier::new(weekday_rules))
    }

    /// Append a tier at the lowest priority (still above the default).
    pub fn with_tier(mut self, tier: impl ScheduleTier + 'static) -> Self {
        self.tiers.push(Box::new(tier));
        self
    }

    pub fn catalog(&self) -> &ScheduleCatalog {
        &self.catalog
    }

    pub fn tier_names(&self) -> Vec<&str> {
        self.tiers.iter().map(|t| t.name()).collect()
    }

    pub fn resolve(&self, date: NaiveDate, overrides: &dyn OverrideStore) -> ResolvedSchedule {
        let ctx = ResolveContext { date, overrides };
        let mut warnings = Vec::new();

        for tier in &self.tiers {
            let Some(matched) = tier.lookup(&ctx) else {
                continue;
            };

            match matched.resolution {
                Resolution::Named(name) => match self.catalog.get(&name) {
                    Some(schedule) => {
                        tracing::debug!(%date, tier = tier.name(), schedule = %name, "schedule resolved");
                        return self.anchored(date, &schedule.name, &schedule.periods, matched.source, warnings);
                    }
                    None => {
                        warnings.push(ResolveWarning::MissingSchedule {
                            source: matched.source,
                            name,
                        });
                    }
                },
                Resolution::Custom(periods) => {
                    let issue = if periods.is_empty() {
                        Err(PeriodIssue::Empty)
                    } else {
                        validate_periods(&periods)
                    };
                    match issue {
                        Ok(()) => {
                            tracing::debug!(%date, tier = tier.name(), "custom schedule resolved");
                            return self.anchored(date, CUSTOM_SCHEDULE_NAME, &periods, matched.source, warnings);
                        }
                        Err(issue) => {
                            warnings.push(ResolveWarning::MalformedOverride { date, issue });
                            break;
                        }
                    }
                }
            }
        }

        let default = self.catalog.default_schedule();
        self.anchored(date, &default.name, &default.periods, ScheduleSource::Default, warnings)
    }

    fn anchored(
        &self,
        date: NaiveDate,
        name: &str,
        periods: &[Period],
        source: ScheduleSource,
        warnings: Vec<ResolveWarning>,
    ) -> ResolvedSchedule {
        ResolvedSchedule {
            date,
            name: name.to_string(),
            source,
            periods: self.catalog.anchor(periods, date),
            warnings,
        }
    }
}
