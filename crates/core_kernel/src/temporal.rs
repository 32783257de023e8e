//! Date windows
//!
//! Policy terms and rolling claims-history lookups are both expressed as an
//! inclusive [`DateWindow`] of calendar dates. The engine never consults the
//! wall clock; every "now" is a date taken from the claim itself.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors related to temporal operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemporalError {
    #[error("Invalid window: start {start} must not be after end {end}")]
    InvalidWindow {
        start: String,
        end: String,
    },

    #[error("Date arithmetic out of range")]
    OutOfRange,
}

/// An inclusive range of calendar dates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, TemporalError> {
        if start > end {
            return Err(TemporalError::InvalidWindow {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        Ok(Self { start, end })
    }

    /// The window of `days` days ending on (and including) `end`
    pub fn trailing(end: NaiveDate, days: u32) -> Result<Self, TemporalError> {
        let start = end
            .checked_sub_days(Days::new(u64::from(days)))
            .ok_or(TemporalError::OutOfRange)?;
        Self::new(start, end)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// Number of days from start to end
    pub fn days(&self) -> i64 {
        days_between(self.start, self.end)
    }
}

/// Signed number of days from `from` to `to`
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}
