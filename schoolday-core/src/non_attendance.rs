//! Non-attendance periods (holidays and breaks) and their per-date map.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::date::days_inclusive;
use crate::error::{SchoolDayError, SchoolDayResult};

/// A labeled, inclusive date range on which students do not attend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NonAttendanceEntry {
    pub label: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl NonAttendanceEntry {
    /// Build an entry, rejecting `start > end`. Single-day entries have
    /// `start == end`.
    pub fn new(label: impl Into<String>, start: NaiveDate, end: NaiveDate) -> SchoolDayResult<Self> {
        let label = label.into();
        if start > end {
            return Err(SchoolDayError::InvalidEntry { label, start, end });
        }
        Ok(NonAttendanceEntry { label, start, end })
    }

    pub fn single(label: impl Into<String>, date: NaiveDate) -> Self {
        NonAttendanceEntry {
            label: label.into(),
            start: date,
            end: date,
        }
    }

    pub fn overlaps(&self, other: &NonAttendanceEntry) -> bool {
        self.start <= other.end && other.start <= self.end
    }
}

/// Find the first pair of overlapping entries, by index into `entries`.
///
/// The map builder tolerates overlap; this check is for loaders that
/// want to reject it before the entries reach the engine.
pub fn find_overlap(entries: &[NonAttendanceEntry]) -> Option<(usize, usize)> {
    let mut order: Vec<usize> = (0..entries.len()).collect();
    order.sort_by_key(|&i| (entries[i].start, entries[i].end));

    // Track the entry reaching furthest so far; a later start at or before
    // its end is an overlap even if the immediate predecessor ended earlier.
    let mut furthest: Option<usize> = None;
    for &i in &order {
        if let Some(f) = furthest {
            if entries[i].start <= entries[f].end {
                return Some((f.min(i), f.max(i)));
            }
        }
        if furthest.is_none_or(|f| entries[i].end > entries[f].end) {
            furthest = Some(i);
        }
    }
    None
}

/// A maximal run of consecutive non-attendance dates sharing one label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NonAttendanceRun {
    pub label: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl NonAttendanceRun {
    pub fn is_single_day(&self) -> bool {
        self.start == self.end
    }
}

/// Date -> label lookup, one key per non-attendance date.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NonAttendanceMap {
    labels: BTreeMap<NaiveDate, String>,
}

impl NonAttendanceMap {
    /// Expand entries into one key per covered date. When entries overlap,
    /// the later entry's label wins.
    pub fn build<'a, I>(entries: I) -> Self
    where
        I: IntoIterator<Item = &'a NonAttendanceEntry>,
    {
        let mut labels = BTreeMap::new();
        for entry in entries {
            for day in days_inclusive(entry.start, entry.end) {
                labels.insert(day, entry.label.clone());
            }
        }
        NonAttendanceMap { labels }
    }

    pub fn label_for(&self, date: NaiveDate) -> Option<&str> {
        self.labels.get(&date).map(String::as_str)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.labels.contains_key(&date)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// The first non-attendance run starting within `[from, until]`.
    ///
    /// If `from` itself is inside a run, the run is reported from `from`.
    /// The run is extended through following consecutive dates with the
    /// same label, but never past `until`.
    pub fn next_run(&self, from: NaiveDate, until: NaiveDate) -> Option<NonAttendanceRun> {
        if from > until {
            return None;
        }

        let mut days = self.labels.range(from..=until);
        let (&start, label) = days.next()?;

        let mut end = start;
        for (&day, next_label) in days {
            if end.succ_opt() == Some(day) && next_label == label {
                end = day;
            } else {
                break;
            }
        }

        Some(NonAttendanceRun {
            label: label.clone(),
            start,
            end,
        })
    }
}
