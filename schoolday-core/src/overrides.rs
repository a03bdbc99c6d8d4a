//! Per-date schedule overrides and the stores that keep them.
//!
//! An override pins a date to a catalog schedule by name, or to an inline
//! list of periods. Stores are injected into the resolver through the
//! [`OverrideStore`] trait; [`MemoryOverrideStore`] backs tests and
//! embedders, [`FileOverrideStore`] persists to a JSON file.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::Serialize;

use crate::date::{date_key, parse_date};
use crate::error::{SchoolDayError, SchoolDayResult};
use crate::schedule::Period;

/// Prefix marking an inline period list in the wire form.
pub const CUSTOM_PREFIX: &str = "CUSTOM:";

/// Name reported for schedules that come from an inline override.
pub const CUSTOM_SCHEDULE_NAME: &str = "CUSTOM";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ScheduleOverride {
    /// Use the catalog schedule with this name.
    Named(String),
    /// Use these periods. Shape is checked at resolution time.
    Custom(Vec<Period>),
}

impl ScheduleOverride {
    /// Parse the wire form: a schedule name, or `CUSTOM:` followed by a
    /// JSON array of periods.
    pub fn from_wire(s: &str) -> SchoolDayResult<Self> {
        let s = s.trim();
        if let Some(json) = s.strip_prefix(CUSTOM_PREFIX) {
            let periods: Vec<Period> = serde_json::from_str(json)
                .map_err(|e| SchoolDayError::InvalidOverride(format!("custom periods: {}", e)))?;
            return Ok(ScheduleOverride::Custom(periods));
        }
        if s.is_empty() {
            return Err(SchoolDayError::InvalidOverride("empty schedule name".into()));
        }
        Ok(ScheduleOverride::Named(s.to_string()))
    }

    pub fn to_wire(&self) -> SchoolDayResult<String> {
        match self {
            ScheduleOverride::Named(name) => Ok(name.clone()),
            ScheduleOverride::Custom(periods) => {
                let json = serde_json::to_string(periods)
                    .map_err(|e| SchoolDayError::Serialization(e.to_string()))?;
                Ok(format!("{}{}", CUSTOM_PREFIX, json))
            }
        }
    }
}

impl fmt::Display for ScheduleOverride {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ScheduleOverride::Named(name) => write!(f, "{}", name),
            ScheduleOverride::Custom(periods) => {
                write!(f, "{} ({} periods)", CUSTOM_SCHEDULE_NAME, periods.len())
            }
        }
    }
}

/// Durable date -> override map. Last write wins.
pub trait OverrideStore: Send {
    fn get(&self, date: NaiveDate) -> Option<ScheduleOverride>;

    fn set(&mut self, date: NaiveDate, value: ScheduleOverride) -> SchoolDayResult<()>;

    /// Returns whether an override was present.
    fn remove(&mut self, date: NaiveDate) -> SchoolDayResult<bool>;

    fn clear(&mut self) -> SchoolDayResult<()>;

    /// All overrides, ordered by date.
    fn entries(&self) -> Vec<(NaiveDate, ScheduleOverride)>;
}

#[derive(Debug, Clone, Default)]
pub struct MemoryOverrideStore {
    overrides: BTreeMap<NaiveDate, ScheduleOverride>,
}

impl MemoryOverrideStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl OverrideStore for MemoryOverrideStore {
    fn get(&self, date: NaiveDate) -> Option<ScheduleOverride> {
        self.overrides.get(&date).cloned()
    }

    fn set(&mut self, date: NaiveDate, value: ScheduleOverride) -> SchoolDayResult<()> {
        self.overrides.insert(date, value);
        Ok(())
    }

    fn remove(&mut self, date: NaiveDate) -> SchoolDayResult<bool> {
        Ok(self.overrides.remove(&date).is_some())
    }

    fn clear(&mut self) -> SchoolDayResult<()> {
        self.overrides.clear();
        Ok(())
    }

    fn entries(&self) -> Vec<(NaiveDate, ScheduleOverride)> {
        self.overrides.iter().map(|(d, o)| (*d, o.clone())).collect()
    }
}

/// Overrides kept in a JSON object of `"YYYY-MM-DD": "<wire form>"`.
///
/// The file is read once on open and rewritten on every change.
#[derive(Debug)]
pub struct FileOverrideStore {
    path: PathBuf,
    overrides: BTreeMap<NaiveDate, ScheduleOverride>,
}

impl FileOverrideStore {
    /// Default location: `<data dir>/schoolday/overrides.json`.
    pub fn default_path() -> SchoolDayResult<PathBuf> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| SchoolDayError::Config("Could not determine data directory".into()))?
            .join("schoolday");

        Ok(data_dir.join("overrides.json"))
    }

    /// Open the store at `path`. A missing file is an empty store.
    ///
    /// Entries with an unreadable date key are dropped. Entries whose value
    /// cannot be parsed are kept as an empty custom list, so resolution for
    /// that date reports a malformed override and uses the default schedule.
    pub fn open(path: impl Into<PathBuf>) -> SchoolDayResult<Self> {
        let path = path.into();
        let mut overrides = BTreeMap::new();

        if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            let raw: BTreeMap<String, String> = serde_json::from_str(&content)
                .map_err(|e| SchoolDayError::Serialization(format!("{}: {}", path.display(), e)))?;

            for (key, value) in raw {
                let Ok(date) = parse_date(&key) else {
                    tracing::warn!(key = %key, path = %path.display(), "dropping override with invalid date");
                    continue;
                };
                let parsed = ScheduleOverride::from_wire(&value).unwrap_or_else(|e| {
                    tracing::warn!(date = %key, error = %e, "unreadable override kept as malformed");
                    ScheduleOverride::Custom(Vec::new())
                });
                overrides.insert(date, parsed);
            }
        }

        Ok(FileOverrideStore { path, overrides })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write `overrides` to disk, then adopt them. On a failed write the
    /// store keeps its previous contents.
    fn commit(&mut self, overrides: BTreeMap<NaiveDate, ScheduleOverride>) -> SchoolDayResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut raw = BTreeMap::new();
        for (date, value) in &overrides {
            raw.insert(date_key(*date), value.to_wire()?);
        }

        let content = serde_json::to_string_pretty(&raw)
            .map_err(|e| SchoolDayError::Serialization(e.to_string()))?;
        std::fs::write(&self.path, content)?;

        self.overrides = overrides;
        Ok(())
    }
}

impl OverrideStore for FileOverrideStore {
    fn get(&self, date: NaiveDate) -> Option<ScheduleOverride> {
        self.overrides.get(&date).cloned()
    }

    fn set(&mut self, date: NaiveDate, value: ScheduleOverride) -> SchoolDayResult<()> {
        let mut next = self.overrides.clone();
        next.insert(date, value);
        self.commit(next)
    }

    fn remove(&mut self, date: NaiveDate) -> SchoolDayResult<bool> {
        if !self.overrides.contains_key(&date) {
            return Ok(false);
        }
        let mut next = self.overrides.clone();
        next.remove(&date);
        self.commit(next)?;
        Ok(true)
    }

    fn clear(&mut self) -> SchoolDayResult<()> {
        self.commit(BTreeMap::new())
    }

    fn entries(&self) -> Vec<(NaiveDate, ScheduleOverride)> {
        self.overrides.iter().map(|(d, o)| (*d, o.clone())).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_from_wire_named_and_custom() {
        assert_eq!(
            ScheduleOverride::from_wire("WED_LATE").unwrap(),
            ScheduleOverride::Named("WED_LATE".into())
        );

        let custom = ScheduleOverride::from_wire(
            r#"CUSTOM:[{"id":"01","label":"Period 01","start":"10:10","end":"10:38"}]"#,
        )
        .unwrap();
        let ScheduleOverride::Custom(periods) = &custom else {
            panic!("expected custom override, got {:?}", custom);
        };
        assert_eq!(periods.len(), 1);
        assert_eq!(periods[0].start, NaiveTime::from_hms_opt(10, 10, 0).unwrap());

        // Wire form survives a second trip.
        let wire = custom.to_wire().unwrap();
        assert!(wire.starts_with(CUSTOM_PREFIX));
        assert_eq!(ScheduleOverride::from_wire(&wire).unwrap(), custom);
    }

    #[test]
    fn test_from_wire_rejects_garbage() {
        assert!(ScheduleOverride::from_wire("CUSTOM:not json").is_err());
        assert!(ScheduleOverride::from_wire("   ").is_err());
    }

    #[test]
    fn test_memory_store_get_set_remove_clear() {
        let mut store = MemoryOverrideStore::new();
        let day = date(2025, 11, 5);

        assert_eq!(store.get(day), None);
        store.set(day, ScheduleOverride::Named("DEFAULT".into())).unwrap();
        store.set(day, ScheduleOverride::Named("WED_LATE".into())).unwrap();
        assert_eq!(store.get(day), Some(ScheduleOverride::Named("WED_LATE".into())));

        assert!(store.remove(day).unwrap());
        assert!(!store.remove(day).unwrap());

        store.set(day, ScheduleOverride::Named("DEFAULT".into())).unwrap();
        store.clear().unwrap();
        assert!(store.entries().is_empty());
    }
}
