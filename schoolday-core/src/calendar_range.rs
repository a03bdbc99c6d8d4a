//! School-year date boundary.

use chrono::NaiveDate;
use serde::Serialize;

use crate::date::days_inclusive;
use crate::error::{SchoolDayError, SchoolDayResult};

/// First and last day of a school year, both inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CalendarRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl CalendarRange {
    /// Build a range, rejecting `start >= end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> SchoolDayResult<Self> {
        if start >= end {
            return Err(SchoolDayError::InvalidRange { start, end });
        }
        Ok(CalendarRange { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Every date of the school year, in order.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        days_inclusive(self.start, self.end)
    }
}
