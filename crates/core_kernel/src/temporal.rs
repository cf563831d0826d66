//! Temporal types for billing cadences and statement periods
//!
//! Business dates in the engine are plain calendar dates (`NaiveDate`);
//! audit timestamps use `DateTime<Utc>`. Cadence advancement is calendar
//! aware: adding a month to Jan 31 lands on the last day of February.

use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from temporal operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemporalError {
    #[error("Invalid period: start {start} is after end {end}")]
    InvalidPeriod { start: NaiveDate, end: NaiveDate },

    #[error("Date arithmetic out of range from {0}")]
    OutOfRange(NaiveDate),
}

/// Cadence at which recurring templates and assessment schedules fire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    Monthly,
    Quarterly,
    Annually,
}

impl Frequency {
    /// Number of months in one period of this cadence
    pub fn months(&self) -> u32 {
        match self {
            Frequency::Monthly => 1,
            Frequency::Quarterly => 3,
            Frequency::Annually => 12,
        }
    }

    /// Advances a date by one period
    ///
    /// Day-of-month is preserved where the calendar allows; otherwise it
    /// clamps to the last day of the target month (Jan 31 -> Feb 28/29).
    pub fn advance(&self, from: NaiveDate) -> Result<NaiveDate, TemporalError> {
        from.checked_add_months(Months::new(self.months()))
            .ok_or(TemporalError::OutOfRange(from))
    }
}

/// An inclusive range of calendar dates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Creates a new range, validating ordering
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, TemporalError> {
        if start > end {
            return Err(TemporalError::InvalidPeriod { start, end });
        }
        Ok(Self { start, end })
    }

    /// Creates the window of dates within `days` of `center` on either side
    pub fn around(center: NaiveDate, days: i64) -> Self {
        Self {
            start: center - chrono::Duration::days(days),
            end: center + chrono::Duration::days(days),
        }
    }

    /// Returns true if the range contains the given date
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

/// Signed number of days from `from` to `to`
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}
